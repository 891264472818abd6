pub mod config;
pub mod consts;
pub mod error;
pub mod execute;
pub mod index;
pub mod record;
pub mod setup;
pub mod source;
pub mod stdin;


pub use config::{ConfigError, IndexConfig, ReadConfig};
pub use error::{IndexError, RecordError, RunError};
pub use execute::Report;
pub use index::{Index, InsertOutcome};
pub use record::Record;
pub use setup::init_tracing;
pub use source::LineSource;
pub use stdin::{process_input, Mode, Processed};
