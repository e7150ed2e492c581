//! tapcfg - resolve, dump and explain tap runner configuration
//!
//! A thin CLI over `tapcfg-core`: it feeds the process environment, the
//! current directory and a token list into the resolver and prints the
//! result.

use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    tapcfg_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
