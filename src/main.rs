//! CLI entry point for sprite-sheet training and sprite generation

use clap::Parser;
use procsprites::io::cli::{Cli, FileProcessor};

fn main() -> procsprites::Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut processor = FileProcessor::new(cli);
    processor.process()
}
