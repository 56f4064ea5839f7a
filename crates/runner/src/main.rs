//! `wordhull` executable.

use anyhow::Result;
use clap::Parser;
use wordhull_cli::cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
