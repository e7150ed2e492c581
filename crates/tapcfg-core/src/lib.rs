//! Core types and resolution engine for tapcfg
//!
//! This crate resolves the effective configuration of the tap test runner
//! from five overlapping sources:
//! - Built-in defaults declared in the option [`Registry`]
//! - Environment variables bound to options
//! - An optional YAML rc file (`./.taprc` unless overridden)
//! - Command-line tokens, including GNU-style combined short flags
//! - Alias and implies expansion between options
//!
//! The registry is immutable once built and can be shared between
//! resolutions. Everything else is rebuilt per call to [`resolve`].

pub mod catalog;
pub mod diagnostic;
pub mod logging;
pub mod option;
pub mod render;
pub mod resolve;
pub mod source;
pub mod validate;

pub use catalog::{CatalogContext, tap_registry};
pub use diagnostic::{Diagnostic, DiagnosticKind, ResolveError, Severity};
pub use option::{
    DefinitionError, Negate, NumRange, OptionDef, OptionDefBuilder, OptionId, OptionKind,
    OptionValue, Registry, RegistryBuilder, Section, ShortMatch, ValueType,
};
pub use render::{render_config_dump, render_help};
pub use resolve::{Provenance, ResolveInputs, ResolvedConfig, Resolver, resolve};
pub use source::{EnvSource, MapEnv, Rank, RawAssignment, RawValue, StdEnv};
pub use validate::{ResolvePolicy, validate};

/// Resolve and validate in one pass.
///
/// Returns the resolved configuration together with every diagnostic
/// collected along the way, with severities adjusted by `policy`. Callers
/// must refuse to proceed when any returned diagnostic is fatal.
pub fn load(
    registry: &Registry,
    inputs: &ResolveInputs<'_>,
    policy: &ResolvePolicy,
) -> Result<(ResolvedConfig, Vec<Diagnostic>), ResolveError> {
    let config = resolve(registry, inputs)?;
    Ok(validate(registry, config, policy))
}
