//! Environment reader
//!
//! Reads the variables bound to options through `env_var`. Process
//! environment access sits behind [`EnvSource`] so tests can inject a
//! synthetic environment instead of mutating real process state.

use super::{Rank, RawAssignment, RawValue};
use crate::option::{Registry, ValueType};
use std::collections::HashMap;
use tracing::trace;

/// Trait for abstracting environment variable access
pub trait EnvSource {
    /// Get the value of an environment variable by name
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment for tests and embedding hosts
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Produce assignments for every option with a bound, present variable.
///
/// Empty values are treated as not set. Flags accept only `1` and `0`;
/// anything else leaves the flag untouched rather than erroring.
pub fn read_env<'a>(
    registry: &'a Registry,
    env: &'a dyn EnvSource,
) -> impl Iterator<Item = RawAssignment> + 'a {
    registry.all().iter().filter_map(move |def| {
        let var = def.env_var.as_deref()?;
        let raw = env.get(var).filter(|v| !v.is_empty())?;
        let value = if def.value_type() == ValueType::Flag {
            match raw.as_str() {
                "1" => RawValue::Switch(true),
                "0" => RawValue::Switch(false),
                _ => {
                    trace!("Ignoring {var}={raw:?} for flag '{}'", def.name);
                    return None;
                }
            }
        } else {
            RawValue::Text(raw)
        };
        trace!("Read {var} for option '{}'", def.name);
        Some(RawAssignment::new(&def.name, value, Rank::Env))
    })
}
