use anyhow::Result;
use clap::Parser;
use conf_parser::cli::{self, Args};

fn main() -> Result<()> {
    let _guard = conf_logging::init_subscriber();
    let args = Args::parse();
    cli::execute(args)
}
