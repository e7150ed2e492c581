//! Core types for option definitions

use serde::Serialize;
use std::fmt;

/// Shape of the value an option stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean switch
    Flag,
    /// Free-form string
    Str,
    /// Number (stored as f64)
    Num,
    /// Ordered list of strings
    List,
}

impl ValueType {
    /// Placeholder shown in help output when no explicit hint is declared
    pub fn hint(self) -> &'static str {
        match self {
            ValueType::Flag => "bool",
            ValueType::Str => "string",
            ValueType::Num => "n",
            ValueType::List => "value",
        }
    }
}

/// Kind of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Str,
    Num,
    List,
    /// Settable only through the environment variable of the same name
    /// (or the rc file); never from the command line.
    EnvOnly(ValueType),
}

impl OptionKind {
    pub fn value_type(self) -> ValueType {
        match self {
            OptionKind::Flag => ValueType::Flag,
            OptionKind::Str => ValueType::Str,
            OptionKind::Num => ValueType::Num,
            OptionKind::List => ValueType::List,
            OptionKind::EnvOnly(inner) => inner,
        }
    }

    pub fn is_env_only(self) -> bool {
        matches!(self, OptionKind::EnvOnly(_))
    }

    pub fn is_flag(self) -> bool {
        self.value_type() == ValueType::Flag
    }

    /// Whether a command-line occurrence consumes a value
    pub fn takes_value(self) -> bool {
        !self.is_flag()
    }
}

/// A strongly-typed option value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<String>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            OptionValue::Num(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Value type this value belongs to
    pub fn value_type(&self) -> ValueType {
        match self {
            OptionValue::Bool(_) => ValueType::Flag,
            OptionValue::Num(_) => ValueType::Num,
            OptionValue::Str(_) => ValueType::Str,
            OptionValue::List(_) => ValueType::List,
        }
    }

    /// Whether this value triggers the owning option's `implies`.
    ///
    /// A set number counts as truthy even when it is zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(v) => *v,
            OptionValue::Num(_) => true,
            OptionValue::Str(v) => !v.is_empty(),
            OptionValue::List(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Num(v) => f.write_str(&format_num(*v)),
            OptionValue::Str(v) => f.write_str(v),
            OptionValue::List(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Num(f64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Num(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        OptionValue::List(v)
    }
}

/// Render a number without a trailing `.0` when it is whole.
pub fn format_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Inclusive numeric bounds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumRange {
    pub fn contains(&self, v: f64) -> bool {
        self.min.is_none_or(|min| v >= min) && self.max.is_none_or(|max| v <= max)
    }
}

impl fmt::Display for NumRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{}..={}", format_num(min), format_num(max)),
            (Some(min), None) => write!(f, ">= {}", format_num(min)),
            (None, Some(max)) => write!(f, "<= {}", format_num(max)),
            (None, None) => f.write_str("any"),
        }
    }
}

/// The false-setting counterpart of a Flag.
///
/// `--no-<name>` always works; `short` adds e.g. `-B` for `--no-bail`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Negate {
    pub short: Option<String>,
    pub description: String,
}

/// Why a value was rejected by an option's constraints
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    OutOfRange { value: f64, range: NumRange },
    NotInSet { value: String, valid: Vec<String> },
    EmptyEntry { index: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OutOfRange { value, range } => write!(
                f,
                "value {} is out of range (expected {range})",
                format_num(*value)
            ),
            Violation::NotInSet { value, valid } => write!(
                f,
                "'{value}' is not a valid value. Valid values: {}",
                valid.join(", ")
            ),
            Violation::EmptyEntry { index } => {
                write!(f, "list entry {index} is empty")
            }
        }
    }
}

/// Complete definition of an option including metadata for help output
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    /// Unique kebab-case key (or the variable name for EnvOnly options)
    pub name: String,

    pub kind: OptionKind,

    /// Short form without the leading dash; may be several characters
    pub short: Option<String>,

    /// `None` means unset
    pub default: Option<OptionValue>,

    /// Environment variable read before command-line parsing
    pub env_var: Option<String>,

    pub negate: Option<Negate>,

    /// Command-line tokens substituted when this option is invoked
    pub alias: Option<Vec<String>>,

    /// Values forced onto other options while this one is truthy
    pub implies: Vec<(String, OptionValue)>,

    pub valid_range: Option<NumRange>,
    pub valid_set: Option<Vec<String>>,

    /// Splits a single List value into entries
    pub delimiter: Option<String>,

    /// Placeholder name for the value in help output
    pub hint: Option<String>,

    pub description: String,

    /// Index into the registry's section list (assigned on define)
    pub section: usize,
}

impl OptionDef {
    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    /// Long negation spelling, e.g. `no-bail`
    pub fn negate_long(&self) -> String {
        format!("no-{}", self.name)
    }

    pub fn hint(&self) -> &str {
        self.hint
            .as_deref()
            .unwrap_or_else(|| self.value_type().hint())
    }

    /// Check a value against the range and enumeration constraints.
    ///
    /// Returns the first violation found. Empty list entries are reported
    /// only when a delimiter is declared, since that is the only case where
    /// an empty entry is ambiguous.
    pub fn check(&self, value: &OptionValue) -> Result<(), Violation> {
        match value {
            OptionValue::Num(v) => {
                if let Some(range) = self.valid_range
                    && !range.contains(*v)
                {
                    return Err(Violation::OutOfRange { value: *v, range });
                }
                Ok(())
            }
            OptionValue::Str(v) => self.check_member(v),
            OptionValue::List(entries) => {
                for entry in entries {
                    self.check_member(entry)?;
                }
                if self.delimiter.is_some()
                    && let Some(index) = entries.iter().position(|e| e.is_empty())
                {
                    return Err(Violation::EmptyEntry { index });
                }
                Ok(())
            }
            OptionValue::Bool(_) => Ok(()),
        }
    }

    fn check_member(&self, v: &str) -> Result<(), Violation> {
        if let Some(valid) = &self.valid_set
            && !valid.iter().any(|candidate| candidate == v)
        {
            return Err(Violation::NotInSet {
                value: v.to_string(),
                valid: valid.clone(),
            });
        }
        Ok(())
    }
}
