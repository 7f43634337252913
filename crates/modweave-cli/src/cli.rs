use std::path::PathBuf;

use clap::Parser;
use modweave_sdk::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "modweave",
    about = "Detect file conflicts between game mods and merge them into a patch mod",
    version
)]
pub struct Cli {
    /// Configuration file to load
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Copy every mod's files into the patch, not just merged ones
    #[arg(short = 'x', long)]
    pub extract: bool,

    /// List file conflicts without merging or writing anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Print information about processed mods and merges
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory the patch mod is written into
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Merge worker threads (default: one per core)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Product in the configuration to use
    pub product_id: String,

    /// Name of the generated patch mod
    pub patch_name: String,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_CONFIG_FILE))
    }

    pub fn out_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
