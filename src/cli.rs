use clap::{Parser, Subcommand};
use mailing_list::consts::*;
use mailing_list::{IndexConfig, Mode, ReadConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailing_list")]
#[command(author, version, about = "Find and remove duplicate postal addresses")]
#[command(propagate_version = true)]
pub struct Cli {
    /// File of three-line address blocks, stdin when omitted
    #[arg(long, global = true, env = "MAILING_LIST_INPUT")]
    pub input: Option<PathBuf>,

    /// Buckets allocated up front
    #[arg(long, global = true, default_value_t = INITIAL_CAPACITY)]
    pub initial_capacity: usize,

    /// Chain length that triggers a rehash once exceeded
    #[arg(long, global = true, default_value_t = MAX_COLLISION)]
    pub max_collision: usize,

    /// Bucket count multiplier applied on rehash
    #[arg(long, global = true, default_value_t = GROWTH_FACTOR)]
    pub growth_factor: usize,

    /// Characters kept per input line
    #[arg(long, global = true, default_value_t = MAX_LINE_LEN)]
    pub max_line_len: usize,

    /// Print diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every distinct address once, sorted
    Unique,

    /// Print addresses repeating an earlier one
    #[command(alias = "dupes")]
    Duplicates,

    /// Look up the addresses of a probe file
    Lookup {
        /// File of three-line address blocks to search for
        #[arg(long)]
        probe: PathBuf,
    },
}

impl Cli {
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            initial_capacity: self.initial_capacity,
            max_collision: self.max_collision,
            growth_factor: self.growth_factor,
        }
    }

    pub fn read_config(&self) -> ReadConfig {
        ReadConfig {
            max_line_len: self.max_line_len,
        }
    }

    pub fn mode(&self) -> Mode {
        match &self.command {
            Commands::Unique => Mode::Unique,
            Commands::Duplicates => Mode::Duplicates,
            Commands::Lookup { probe } => Mode::Lookup {
                probe: probe.clone(),
            },
        }
    }
}
