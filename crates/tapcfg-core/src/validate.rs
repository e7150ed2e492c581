//! Validator
//!
//! Checks every set value against its option's range and enumeration
//! constraints. Values are never replaced; a failed check only produces a
//! diagnostic, and the caller decides whether to proceed.

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::option::{OptionDef, OptionValue, Registry, Violation};
use crate::resolve::ResolvedConfig;
use crate::source::Rank;
use tracing::debug;

/// Host policy for diagnostic severities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvePolicy {
    /// Unknown options and rc keys become fatal
    pub strict: bool,
    /// Validation failures become warnings
    pub lenient_validation: bool,
}

impl ResolvePolicy {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Adjust a diagnostic's severity to this policy
    pub fn apply(&self, diagnostic: &mut Diagnostic) {
        if self.strict && diagnostic.kind.is_unknown() {
            diagnostic.severity = Severity::Error;
        }
        if self.lenient_validation && diagnostic.kind.is_validation() {
            diagnostic.severity = Severity::Warning;
        }
    }
}

/// Validate a resolved configuration.
///
/// Returns the configuration unchanged apart from its diagnostic list, which
/// afterwards holds resolution and validation diagnostics alike, adjusted by
/// `policy`. The same list is returned alongside for convenience.
pub fn validate(
    registry: &Registry,
    mut config: ResolvedConfig,
    policy: &ResolvePolicy,
) -> (ResolvedConfig, Vec<Diagnostic>) {
    let mut diagnostics = std::mem::take(&mut config.diagnostics);

    for def in registry.all().iter().filter(|def| !def.is_alias()) {
        let Some(value) = config.get(&def.name) else {
            continue;
        };
        let Err(violation) = def.check(value) else {
            continue;
        };
        if reported_by_bound_option(registry, &config, def, value) {
            continue;
        }
        let kind = match violation {
            Violation::OutOfRange { .. } => DiagnosticKind::OutOfRange,
            Violation::NotInSet { .. } => DiagnosticKind::NotInSet,
            Violation::EmptyEntry { .. } => DiagnosticKind::EmptyListEntry,
        };
        let source = config
            .provenance(&def.name)
            .map_or(Rank::Default, |p| p.rank());
        diagnostics.push(
            Diagnostic::new(kind, source, format!("{}: {violation}", def.name)).for_option(&def.name),
        );
    }

    for diagnostic in &mut diagnostics {
        policy.apply(diagnostic);
    }
    let fatal = diagnostics.iter().filter(|d| d.is_fatal()).count();
    debug!(
        "Validation finished with {} diagnostic(s), {fatal} fatal",
        diagnostics.len()
    );

    config.diagnostics = diagnostics.clone();
    (config, diagnostics)
}

/// An environment-only option mirrors the variable of a regular option
/// (`TAP_TIMEOUT` and `timeout`). One bad value is reported once, on the
/// regular option, when both hold it.
fn reported_by_bound_option(
    registry: &Registry,
    config: &ResolvedConfig,
    def: &OptionDef,
    value: &OptionValue,
) -> bool {
    def.kind.is_env_only()
        && registry.all().iter().any(|other| {
            !other.kind.is_env_only()
                && other.env_var == def.env_var
                && config.get(&other.name) == Some(value)
                && other.check(value).is_err()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{OptionDefBuilder, ValueType};
    use crate::resolve::{ResolveInputs, resolve};
    use crate::source::MapEnv;

    fn registry() -> Registry {
        let mut builder = Registry::builder();
        let defs = [
            OptionDefBuilder::num("branches").min(0.0).max(100.0).default(100).build(),
            OptionDefBuilder::string("reporter")
                .short("R")
                .valid(["spec", "tap", "dot"])
                .build(),
            OptionDefBuilder::list("grep").delimiter("\n").env_var("TAP_GREP").build(),
            OptionDefBuilder::num("timeout").min(0.0).env_var("TAP_TIMEOUT").build(),
            OptionDefBuilder::env("TAP_TIMEOUT", ValueType::Num).min(0.0).build(),
        ];
        for def in defs {
            builder.define(def.unwrap()).unwrap();
        }
        builder.build().unwrap()
    }

    fn check(tokens: &[&str], env: &MapEnv, policy: ResolvePolicy) -> (ResolvedConfig, Vec<Diagnostic>) {
        let registry = registry();
        let args: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let config = resolve(&registry, &ResolveInputs::new(env, &args)).unwrap();
        validate(&registry, config, &policy)
    }

    #[test]
    fn test_valid_config_has_no_diagnostics() {
        let (_, diagnostics) = check(&["-R", "spec", "--branches=90"], &MapEnv::new(), ResolvePolicy::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_out_of_range_is_one_fatal_and_not_substituted() {
        let (config, diagnostics) =
            check(&["--branches=150"], &MapEnv::new(), ResolvePolicy::default());
        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.kind, DiagnosticKind::OutOfRange);
        assert!(diag.is_fatal());
        assert_eq!(diag.source, Rank::Cli);
        assert_eq!(diag.option.as_deref(), Some("branches"));
        assert_eq!(config.get("branches"), Some(&OptionValue::Num(150.0)));
        assert!(!config.is_ok());
    }

    #[test]
    fn test_not_in_set() {
        let (_, diagnostics) = check(&["-R", "fancy"], &MapEnv::new(), ResolvePolicy::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::NotInSet);
        assert!(diagnostics[0].message.contains("Valid values: spec, tap, dot"));
    }

    #[test]
    fn test_empty_list_entry_is_warning() {
        let env = MapEnv::from_pairs([("TAP_GREP", "a\n\nb")]);
        let (_, diagnostics) = check(&[], &env, ResolvePolicy::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::EmptyListEntry);
        assert_eq!(diagnostics[0].source, Rank::Env);
        assert!(!diagnostics[0].is_fatal());
    }

    #[test]
    fn test_strict_promotes_unknown_options() {
        let (_, lenient) = check(&["--nope"], &MapEnv::new(), ResolvePolicy::default());
        assert!(!lenient[0].is_fatal());

        let (config, strict) = check(&["--nope"], &MapEnv::new(), ResolvePolicy::strict());
        assert!(strict[0].is_fatal());
        assert_eq!(config.diagnostics(), strict.as_slice());
    }

    #[test]
    fn test_lenient_validation_demotes() {
        let policy = ResolvePolicy {
            lenient_validation: true,
            ..ResolvePolicy::default()
        };
        let (config, diagnostics) = check(&["--branches=-1"], &MapEnv::new(), policy);
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_fatal());
        assert!(config.is_ok());
    }

    #[test]
    fn test_mirrored_variable_reported_once() {
        let env = MapEnv::from_pairs([("TAP_TIMEOUT", "-5")]);
        let (_, diagnostics) = check(&[], &env, ResolvePolicy::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].option.as_deref(), Some("timeout"));

        // Once the command line overrides the option, the variable is the
        // only holder of the bad value.
        let (_, diagnostics) = check(&["--timeout=5"], &env, ResolvePolicy::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].option.as_deref(), Some("TAP_TIMEOUT"));
    }
}
