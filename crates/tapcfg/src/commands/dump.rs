//! Dump command implementation

use anyhow::Result;
use clap::Args;
use tapcfg_core::{ResolvePolicy, render_config_dump};

/// Print the resolved configuration in rc file format
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Treat unknown options and rc file keys as errors
    #[arg(long)]
    strict: bool,

    /// Tokens to resolve, as they would be passed to tap
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// Execute the dump command
pub fn execute(args: DumpArgs) -> Result<()> {
    let registry = super::registry()?;
    let policy = ResolvePolicy {
        strict: args.strict,
        ..ResolvePolicy::default()
    };
    let (config, diagnostics) = super::load(&registry, &args.tokens, &policy)?;

    super::report(&diagnostics)?;
    print!("{}", render_config_dump(&config)?);
    Ok(())
}
