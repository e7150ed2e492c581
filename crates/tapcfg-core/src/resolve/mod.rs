//! Resolver
//!
//! Merges the source readers' assignments into one [`ResolvedConfig`]:
//!
//! 1. Seed every option with its default
//! 2. Pick the rc file path from the command line, then the environment,
//!    then the rc option's default, and load it
//! 3. Apply environment, rc file and command-line assignments in that order;
//!    within a source, in arrival order (last wins, repeated list tokens
//!    append, rc file list values replace)
//! 4. Expand aliases in place, at the rank of the invoking assignment
//! 5. Overlay `implies` values until they settle

mod config;
mod implies;

pub use config::{Provenance, ResolvedConfig};

use crate::diagnostic::{Diagnostic, DiagnosticKind, ResolveError};
use crate::option::{DefinitionError, OptionDef, OptionId, OptionValue, Registry};
use crate::source::{
    self, EnvSource, Rank, RawAssignment, RawValue, cli::parse_tokens, parse_cli, read_env,
    read_rc_file,
};
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Everything a single resolution reads from the outside world
#[derive(Clone, Copy)]
pub struct ResolveInputs<'a> {
    pub env: &'a dyn EnvSource,
    /// Command-line tokens without the program name
    pub args: &'a [String],
}

impl<'a> ResolveInputs<'a> {
    pub fn new(env: &'a dyn EnvSource, args: &'a [String]) -> Self {
        Self { env, args }
    }
}

/// Current explicit state of one option
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub value: Option<OptionValue>,
    /// Rank of the last explicit assignment; `Default` when never assigned
    pub rank: Rank,
}

/// Resolves configurations against one registry
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Run one resolution pass.
    ///
    /// Fails only on an unreadable rc file or a runaway expansion; every
    /// other problem is recorded as a diagnostic on the result.
    pub fn resolve(&self, inputs: &ResolveInputs<'_>) -> Result<ResolvedConfig, ResolveError> {
        let registry = self.registry;
        let env: Vec<RawAssignment> = read_env(registry, inputs.env).collect();
        let cli = parse_cli(registry, inputs.args);
        debug!(
            "Read {} environment and {} command-line assignments",
            env.len(),
            cli.assignments.len()
        );

        let mut state = State::new(registry);

        let rc = self.rc_path(&env, &cli.assignments);
        let mut rc_assignments = Vec::new();
        let mut rc_file = None;
        if let Some((path, explicit)) = rc {
            match read_rc_file(registry, &path)? {
                Some(output) => {
                    rc_assignments = output.assignments;
                    state.diagnostics.extend(output.diagnostics);
                    rc_file = Some(path);
                }
                None if explicit => {
                    warn!("Requested rc file {path:?} does not exist");
                    state.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::RcFileMissing,
                        Rank::RcFile,
                        format!("rc file {} does not exist", path.display()),
                    ));
                }
                None => {}
            }
        }
        state.diagnostics.extend(cli.diagnostics);

        for assignment in env.iter().chain(&rc_assignments).chain(&cli.assignments) {
            state.apply(assignment, 0)?;
        }

        let overlay = implies::settle(registry, &state.slots)?;
        Ok(state.finish(overlay, cli.positionals, rc_file))
    }

    /// Rc file to load and whether it was named explicitly
    fn rc_path(&self, env: &[RawAssignment], cli: &[RawAssignment]) -> Option<(PathBuf, bool)> {
        let def = self.registry.rc_option()?;
        let named = |assignments: &[RawAssignment]| {
            assignments
                .iter()
                .rev()
                .filter(|a| a.option == def.name)
                .find_map(|a| source::coerce(def, &a.value).ok().flatten())
        };
        if let Some(OptionValue::Str(path)) = named(cli).or_else(|| named(env)) {
            return Some((PathBuf::from(path), true));
        }
        def.default
            .as_ref()
            .and_then(OptionValue::as_str)
            .map(|path| (PathBuf::from(path), false))
    }
}

/// Resolve with a throwaway [`Resolver`]
pub fn resolve(registry: &Registry, inputs: &ResolveInputs<'_>) -> Result<ResolvedConfig, ResolveError> {
    Resolver::new(registry).resolve(inputs)
}

struct State<'r> {
    registry: &'r Registry,
    slots: Vec<Slot>,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> State<'r> {
    fn new(registry: &'r Registry) -> Self {
        let slots = registry
            .all()
            .iter()
            .map(|def| Slot {
                value: def.default.clone(),
                rank: Rank::Default,
            })
            .collect();
        Self {
            registry,
            slots,
            diagnostics: Vec::new(),
        }
    }

    fn apply(&mut self, assignment: &RawAssignment, depth: usize) -> Result<(), ResolveError> {
        let registry = self.registry;
        let Some(id) = registry.id_of(&assignment.option) else {
            return Ok(());
        };
        let def = registry.get(id);
        let rank = assignment.rank;

        let value = match source::coerce(def, &assignment.value) {
            Ok(value) => value,
            Err(reason) => {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::InvalidValue,
                        rank,
                        format!("invalid value for '{}': {reason}", def.name),
                    )
                    .for_option(&def.name),
                );
                return Ok(());
            }
        };

        if let Some(tokens) = &def.alias {
            return self.expand_alias(def, tokens, value, rank, depth);
        }
        trace!("{} = {:?} ({rank})", def.name, value);
        // Rc file values are whole: `key: null` or a sequence replaces the list.
        let append = !matches!(assignment.value, RawValue::Yaml(_));
        self.store(id, value, rank, append);
        Ok(())
    }

    fn expand_alias(
        &mut self,
        def: &OptionDef,
        tokens: &[String],
        value: Option<OptionValue>,
        rank: Rank,
        depth: usize,
    ) -> Result<(), ResolveError> {
        if !value.as_ref().is_some_and(OptionValue::is_truthy) {
            warn!("Ignoring negated alias '{}'", def.name);
            self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::AliasNegated,
                    rank,
                    format!("'{}' is an alias and cannot be turned off; ignored", def.name),
                )
                .for_option(&def.name),
            );
            return Ok(());
        }
        if depth >= self.registry.iteration_cap() {
            return Err(DefinitionError::AliasCycle(def.name.clone()).into());
        }

        trace!("Expanding alias {} -> {}", def.name, tokens.join(" "));
        let expansion = parse_tokens(self.registry, tokens, rank);
        self.diagnostics.extend(expansion.diagnostics);
        for assignment in &expansion.assignments {
            self.apply(assignment, depth + 1)?;
        }
        Ok(())
    }

    fn store(&mut self, id: OptionId, value: Option<OptionValue>, rank: Rank, append: bool) {
        let slot = &mut self.slots[id.0];
        if append
            && slot.rank == rank
            && let Some(OptionValue::List(existing)) = &mut slot.value
            && let Some(OptionValue::List(entries)) = &value
        {
            existing.extend(entries.iter().cloned());
        } else {
            slot.value = value;
        }
        slot.rank = rank;
    }

    fn finish(
        self,
        overlay: Vec<Option<implies::Implied>>,
        positionals: Vec<String>,
        rc_file: Option<PathBuf>,
    ) -> ResolvedConfig {
        let mut config = ResolvedConfig {
            positionals,
            rc_file,
            diagnostics: self.diagnostics,
            ..ResolvedConfig::default()
        };

        let entries = self.registry.all().iter().zip(self.slots).zip(overlay);
        for ((def, slot), implied) in entries {
            if def.is_alias() {
                continue;
            }
            let (value, provenance) = match implied {
                Some(implied) => (
                    Some(implied.value),
                    Provenance::Implied {
                        by: self.registry.get(implied.by).name.clone(),
                        rank: implied.rank,
                    },
                ),
                None if slot.rank == Rank::Default => (slot.value, Provenance::Default),
                None => (slot.value, Provenance::Explicit { rank: slot.rank }),
            };
            config.values.insert(def.name.clone(), value);
            config.provenance.insert(def.name.clone(), provenance);
        }
        config
    }
}
