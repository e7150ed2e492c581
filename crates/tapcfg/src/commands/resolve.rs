//! Resolve command implementation

use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value, json};
use tapcfg_core::{ResolvePolicy, render_config_dump, render_help};

/// Resolve a tap command line
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Treat unknown options and rc file keys as errors
    #[arg(long)]
    strict: bool,

    /// Report out-of-range and invalid values as warnings
    #[arg(long)]
    lenient: bool,

    /// Print the YAML dump instead of JSON
    #[arg(long)]
    yaml: bool,

    /// Tokens to resolve, as they would be passed to tap
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// Execute the resolve command
///
/// The resolved `help` and `dump-config` flags behave as they would for tap
/// itself: help wins over the dump, the dump wins over JSON. Nothing is
/// printed to stdout when a diagnostic is fatal.
pub fn execute(args: ResolveArgs) -> Result<()> {
    let registry = super::registry()?;
    let policy = ResolvePolicy {
        strict: args.strict,
        lenient_validation: args.lenient,
    };
    let (config, diagnostics) = super::load(&registry, &args.tokens, &policy)?;
    super::report(&diagnostics)?;

    if config.flag("help") {
        print!("{}", render_help(&registry));
    } else if args.yaml || config.flag("dump-config") {
        print!("{}", render_config_dump(&config)?);
    } else {
        let env: Map<String, Value> = config
            .env_exports(&registry)
            .into_iter()
            .map(|(var, value)| (var, Value::String(value)))
            .collect();
        let output = json!({
            "config": config.values(),
            "positionals": config.positionals(),
            "rcFile": config.rc_file().map(|p| p.display().to_string()),
            "env": env,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
