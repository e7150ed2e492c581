//! Fluent builder API for creating option definitions

use super::error::DefinitionError;
use super::types::{Negate, NumRange, OptionDef, OptionKind, OptionValue, ValueType};

/// Builder for creating option definitions with a fluent API
#[derive(Debug, Clone)]
pub struct OptionDefBuilder {
    def: OptionDef,
}

impl OptionDefBuilder {
    fn new(name: &str, kind: OptionKind) -> Self {
        let default = match kind.value_type() {
            ValueType::Flag => Some(OptionValue::Bool(false)),
            ValueType::List => Some(OptionValue::List(Vec::new())),
            ValueType::Str | ValueType::Num => None,
        };
        Self {
            def: OptionDef {
                name: name.to_string(),
                kind,
                short: None,
                default,
                env_var: None,
                negate: None,
                alias: None,
                implies: Vec::new(),
                valid_range: None,
                valid_set: None,
                delimiter: None,
                hint: None,
                description: String::new(),
                section: 0,
            },
        }
    }

    /// Boolean flag, default `false`
    pub fn flag(name: &str) -> Self {
        Self::new(name, OptionKind::Flag)
    }

    /// String option, default unset
    pub fn string(name: &str) -> Self {
        Self::new(name, OptionKind::Str)
    }

    /// Numeric option, default unset
    pub fn num(name: &str) -> Self {
        Self::new(name, OptionKind::Num)
    }

    /// List option, default empty
    pub fn list(name: &str) -> Self {
        Self::new(name, OptionKind::List)
    }

    /// Environment-only option bound to the variable `name`
    pub fn env(name: &str, ty: ValueType) -> Self {
        let mut builder = Self::new(name, OptionKind::EnvOnly(ty));
        builder.def.env_var = Some(name.to_string());
        builder
    }

    pub fn short(mut self, short: &str) -> Self {
        self.def.short = Some(short.to_string());
        self
    }

    pub fn default(mut self, value: impl Into<OptionValue>) -> Self {
        self.def.default = Some(value.into());
        self
    }

    /// Explicitly leave the option unset by default
    pub fn no_default(mut self) -> Self {
        self.def.default = None;
        self
    }

    pub fn env_var(mut self, var: &str) -> Self {
        self.def.env_var = Some(var.to_string());
        self
    }

    /// Add a negate short form (`-B` for `--no-bail`) with its own help text
    pub fn negate(mut self, short: Option<&str>, description: &str) -> Self {
        self.def.negate = Some(Negate {
            short: short.map(str::to_string),
            description: description.to_string(),
        });
        self
    }

    /// Make the option an alias for the given command-line tokens
    pub fn alias<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.alias = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    pub fn implies(mut self, target: &str, value: impl Into<OptionValue>) -> Self {
        self.def.implies.push((target.to_string(), value.into()));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.def.valid_range.get_or_insert_with(NumRange::default).min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.def.valid_range.get_or_insert_with(NumRange::default).max = Some(max);
        self
    }

    pub fn valid<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.valid_set = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.def.delimiter = Some(delimiter.to_string());
        self
    }

    pub fn hint(mut self, hint: &str) -> Self {
        self.def.hint = Some(hint.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.def.description = desc.to_string();
        self
    }

    /// Build the option definition
    ///
    /// Returns an error when metadata does not fit the option's kind.
    pub fn build(self) -> Result<OptionDef, DefinitionError> {
        let def = self.def;
        if def.name.is_empty() || def.name.starts_with('-') || def.name.contains('=') {
            return Err(DefinitionError::InvalidName(def.name));
        }
        let invalid = |reason: &str| DefinitionError::Invalid {
            option: def.name.clone(),
            reason: reason.to_string(),
        };

        if let Some(short) = &def.short
            && (short.is_empty() || short.starts_with('-') || short.contains('='))
        {
            return Err(invalid("short form must be non-empty without '-' or '='"));
        }

        let ty = def.value_type();
        if def.alias.is_some() && def.kind != OptionKind::Flag {
            return Err(invalid("only flags can be aliases"));
        }
        if def.alias.as_ref().is_some_and(|tokens| tokens.is_empty()) {
            return Err(invalid("alias must expand to at least one token"));
        }
        if def.negate.is_some() && def.kind != OptionKind::Flag {
            return Err(invalid("only flags can declare a negation"));
        }
        if def.kind.is_env_only() && def.short.is_some() {
            return Err(invalid("environment-only options have no short form"));
        }
        if def.valid_range.is_some() && ty != ValueType::Num {
            return Err(invalid("a numeric range requires a number option"));
        }
        if def.valid_set.is_some() && !matches!(ty, ValueType::Str | ValueType::List) {
            return Err(invalid("a set of valid values requires a string or list option"));
        }
        if def.delimiter.is_some() && ty != ValueType::List {
            return Err(invalid("a delimiter requires a list option"));
        }
        match &def.default {
            None if ty == ValueType::Flag => {
                return Err(invalid("flags always have a default"));
            }
            Some(value) if value.value_type() != ty => {
                return Err(invalid("default value does not match the option type"));
            }
            _ => {}
        }

        Ok(def)
    }
}
