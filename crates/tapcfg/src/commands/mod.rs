//! CLI command dispatch and execution

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tapcfg_core::{
    CatalogContext, Diagnostic, Registry, ResolveInputs, ResolvePolicy, ResolvedConfig, StdEnv,
    tap_registry,
};
use tracing::debug;

mod dump;
mod help;
mod resolve;

/// tapcfg - layered option resolution for the tap test runner
#[derive(Parser, Debug)]
#[command(
    name = "tapcfg",
    version,
    disable_help_subcommand = true,
    about = "Resolve tap runner configuration",
    long_about = "Resolves the effective tap configuration from defaults, environment \
                  variables, the rc file and command-line tokens"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve tokens and print the configuration as JSON
    Resolve(resolve::ResolveArgs),

    /// Print help for every tap option
    Help(help::HelpArgs),

    /// Resolve tokens and print the configuration as YAML
    Dump(dump::DumpArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Resolve(args) => resolve::execute(args),
            Commands::Help(args) => help::execute(args),
            Commands::Dump(args) => dump::execute(args),
        }
    }
}

/// Build the tap catalog for the running process
fn registry() -> Result<Registry> {
    let ctx = CatalogContext::detect()?;
    debug!("Catalog context: {ctx:?}");
    Ok(tap_registry(&ctx)?)
}

/// Resolve `tokens` against the process environment
fn load(
    registry: &Registry,
    tokens: &[String],
    policy: &ResolvePolicy,
) -> Result<(ResolvedConfig, Vec<Diagnostic>)> {
    let inputs = ResolveInputs::new(&StdEnv, tokens);
    Ok(tapcfg_core::load(registry, &inputs, policy)?)
}

/// Print diagnostics to stderr; fail when any of them is fatal
fn report(diagnostics: &[Diagnostic]) -> Result<()> {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
    let fatal = diagnostics.iter().filter(|d| d.is_fatal()).count();
    if fatal > 0 {
        bail!("{fatal} fatal problem(s) in the configuration");
    }
    Ok(())
}
