//! The resolved configuration handed to downstream collaborators

use crate::diagnostic::Diagnostic;
use crate::option::{OptionValue, Registry, format_num};
use crate::source::Rank;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where an option's final value came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Provenance {
    /// Built-in default
    Default,
    /// Set directly (or through an alias) by a source
    Explicit { rank: Rank },
    /// Forced by another option's `implies`
    Implied { by: String, rank: Rank },
}

impl Provenance {
    /// Rank the value is attributed to
    pub fn rank(&self) -> Rank {
        match self {
            Provenance::Default => Rank::Default,
            Provenance::Explicit { rank } | Provenance::Implied { rank, .. } => *rank,
        }
    }
}

/// Final typed value of every non-alias option, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub(crate) values: IndexMap<String, Option<OptionValue>>,
    pub(crate) provenance: IndexMap<String, Provenance>,
    pub(crate) positionals: Vec<String>,
    pub(crate) rc_file: Option<PathBuf>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl ResolvedConfig {
    /// Every non-alias option mapped to its value (`None` when unset)
    pub fn values(&self) -> &IndexMap<String, Option<OptionValue>> {
        &self.values
    }

    /// Value of an option, `None` when unset or unknown
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Whether `name` is a key of this configuration
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Flag value; unset and non-flag options read as `false`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn num(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_num)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// List entries; unset lists read as empty
    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).and_then(OptionValue::as_list).unwrap_or(&[])
    }

    pub fn provenance(&self, name: &str) -> Option<&Provenance> {
        self.provenance.get(name)
    }

    /// Non-option command-line tokens (test files), in order
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Rc file that was actually loaded, if any
    pub fn rc_file(&self) -> Option<&Path> {
        self.rc_file.as_deref()
    }

    /// Diagnostics collected so far (resolution, plus validation once validated)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Environment assignments that hand this configuration to child
    /// processes.
    ///
    /// Every option bound to a variable with `env_var` is exported when set:
    /// flags as `1`/`0`, numbers without a trailing `.0`, lists joined with
    /// their delimiter (newline when none is declared). Nothing is written to
    /// the process environment; applying the pairs is the host's job.
    pub fn env_exports(&self, registry: &Registry) -> Vec<(String, String)> {
        registry
            .all()
            .iter()
            .filter(|def| !def.is_alias() && !def.kind.is_env_only())
            .filter_map(|def| {
                let var = def.env_var.as_deref()?;
                let text = match self.get(&def.name)? {
                    OptionValue::Bool(on) => String::from(if *on { "1" } else { "0" }),
                    OptionValue::Num(n) => format_num(*n),
                    OptionValue::Str(s) => s.clone(),
                    OptionValue::List(items) => {
                        items.join(def.delimiter.as_deref().unwrap_or("\n"))
                    }
                };
                Some((var.to_string(), text))
            })
            .collect()
    }

    /// True when no collected diagnostic is fatal
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}
