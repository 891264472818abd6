use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber, logging to stderr.
///
/// A `RUST_LOG` setting wins when present. Otherwise `verbose` picks debug
/// output over warnings.
pub fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(std::env::var("RUST_LOG").ok().as_deref(), verbose))
        .init();
}

fn env_filter(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_rust_log_level_is_kept() {
        let filter = env_filter(Some("debug"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_verbose_without_rust_log() {
        assert_eq!(
            env_filter(None, true).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            env_filter(None, false).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }

    #[test]
    fn test_unparsable_rust_log_falls_back() {
        let filter = env_filter(Some("mailing_list=loud"), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
