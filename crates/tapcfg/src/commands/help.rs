//! Help command implementation

use anyhow::Result;
use clap::Args;
use tapcfg_core::render_help;

/// Print option help
#[derive(Args, Debug)]
pub struct HelpArgs {}

/// Execute the help command
pub fn execute(_args: HelpArgs) -> Result<()> {
    let registry = super::registry()?;
    print!("{}", render_help(&registry));
    Ok(())
}
