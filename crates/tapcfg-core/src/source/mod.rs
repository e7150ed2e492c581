//! Source readers
//!
//! Each reader turns one input (process environment, rc file, command-line
//! tokens) into an ordered list of [`RawAssignment`]s. Readers never look at
//! each other's output; ranking and merging is the resolver's job.

pub mod cli;
pub mod env;
pub mod rcfile;

pub use cli::{CliOutput, parse_cli};
pub use env::{EnvSource, MapEnv, StdEnv, read_env};
pub use rcfile::{RcOutput, parse_rc_str, read_rc_file};

use crate::option::{OptionDef, OptionValue, ValueType};
use serde::Serialize;
use std::fmt;

/// Precedence tier of an input source (higher wins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rank {
    Default = 0,
    Env = 1,
    RcFile = 2,
    Cli = 3,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Default => f.write_str("default"),
            Rank::Env => f.write_str("environment"),
            Rank::RcFile => f.write_str("rc file"),
            Rank::Cli => f.write_str("command line"),
        }
    }
}

/// An uncoerced value as it arrived from a source
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text typed on the command line or read from the environment
    Text(String),
    /// Bare flag (`true`) or negation (`false`)
    Switch(bool),
    /// Structured value from the rc file
    Yaml(serde_yaml::Value),
}

/// One `option = value` assignment from a source
#[derive(Debug, Clone, PartialEq)]
pub struct RawAssignment {
    pub option: String,
    pub value: RawValue,
    pub rank: Rank,
}

impl RawAssignment {
    pub fn new(option: &str, value: RawValue, rank: Rank) -> Self {
        Self {
            option: option.to_string(),
            value,
            rank,
        }
    }
}

/// Coerce a raw value to the option's type.
///
/// `Ok(None)` means the value unsets the option. The error is a short
/// reason suitable for a diagnostic message.
pub(crate) fn coerce(def: &OptionDef, raw: &RawValue) -> Result<Option<OptionValue>, String> {
    let ty = def.value_type();
    match raw {
        RawValue::Switch(on) => match ty {
            ValueType::Flag => Ok(Some(OptionValue::Bool(*on))),
            _ => Err("a value is required".to_string()),
        },
        RawValue::Text(text) => coerce_text(def, text).map(Some),
        RawValue::Yaml(value) => coerce_yaml(def, value),
    }
}

fn coerce_text(def: &OptionDef, text: &str) -> Result<OptionValue, String> {
    match def.value_type() {
        ValueType::Flag => match text {
            "true" | "1" => Ok(OptionValue::Bool(true)),
            "false" | "0" => Ok(OptionValue::Bool(false)),
            _ => Err(format!("'{text}' is not a boolean (expected true, false, 1 or 0)")),
        },
        ValueType::Str => Ok(OptionValue::Str(text.to_string())),
        ValueType::Num => parse_num(text).map(OptionValue::Num),
        ValueType::List => Ok(OptionValue::List(split_list(def, text))),
    }
}

fn coerce_yaml(def: &OptionDef, value: &serde_yaml::Value) -> Result<Option<OptionValue>, String> {
    use serde_yaml::Value;

    let ty = def.value_type();
    match value {
        Value::Null => Ok(match ty {
            ValueType::Flag => Some(OptionValue::Bool(false)),
            ValueType::List => Some(OptionValue::List(Vec::new())),
            ValueType::Str | ValueType::Num => None,
        }),
        Value::Bool(b) => match ty {
            ValueType::Flag => Ok(Some(OptionValue::Bool(*b))),
            ValueType::Num => Err(format!("'{b}' is not a number")),
            _ => coerce_text(def, &b.to_string()).map(Some),
        },
        Value::Number(n) => match ty {
            ValueType::Num => n
                .as_f64()
                .filter(|v| v.is_finite())
                .map(|v| Some(OptionValue::Num(v)))
                .ok_or_else(|| format!("'{n}' is not a finite number")),
            _ => coerce_text(def, &n.to_string()).map(Some),
        },
        Value::String(s) => coerce_text(def, s).map(Some),
        Value::Sequence(items) if ty == ValueType::List => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                _ => Err("list entries must be scalars".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Some(OptionValue::List(entries))),
        Value::Sequence(_) => Err("expected a single value, found a list".to_string()),
        Value::Mapping(_) | Value::Tagged(_) => Err("nested values are not supported".to_string()),
    }
}

fn parse_num(text: &str) -> Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{text}' is not a number"))
}

fn split_list(def: &OptionDef, text: &str) -> Vec<String> {
    match &def.delimiter {
        Some(delimiter) => text.split(delimiter.as_str()).map(str::to_string).collect(),
        None => vec![text.to_string()],
    }
}
