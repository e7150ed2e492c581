//! Diagnostics and fatal resolution errors

use crate::option::DefinitionError;
use crate::source::Rank;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort resolution before any configuration is produced
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The option catalog is inconsistent
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The rc file exists but could not be read
    #[error("Failed to read rc file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The rc file is not valid YAML
    #[error("Failed to parse rc file {path}: {source}")]
    RcParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The rc file is valid YAML but not a flat key/value mapping
    #[error("Rc file {path} is not a key/value mapping: {message}")]
    RcFormat { path: PathBuf, message: String },

    /// Implied values kept changing past the iteration cap
    #[error("Implied option values did not settle after {0} passes")]
    ImpliesDiverged(usize),
}

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, never blocking
    Warning,
    /// Fatal: the caller must refuse to proceed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Unrecognized command-line token
    UnknownOption,
    /// Rc file key that names no option
    UnknownRcKey,
    /// Value could not be coerced to the option's type
    InvalidValue,
    /// Value-taking option at the end of the token list
    MissingValue,
    /// Number outside the declared range
    OutOfRange,
    /// String outside the declared set of valid values
    NotInSet,
    /// Empty entry in a delimited list
    EmptyListEntry,
    /// Explicitly requested rc file does not exist
    RcFileMissing,
    /// Alias invoked with a false value
    AliasNegated,
}

impl DiagnosticKind {
    pub fn default_severity(self) -> Severity {
        if self.is_validation() {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// Unknown names, promoted to errors in strict mode
    pub fn is_unknown(self) -> bool {
        matches!(self, DiagnosticKind::UnknownOption | DiagnosticKind::UnknownRcKey)
    }

    /// Value problems, demoted to warnings under a lenient policy
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            DiagnosticKind::InvalidValue
                | DiagnosticKind::MissingValue
                | DiagnosticKind::OutOfRange
                | DiagnosticKind::NotInSet
        )
    }
}

/// A structured report of a resolution or validation problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Option the problem is about, when it is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Source the offending input came from
    pub source: Rank,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, source: Rank, message: impl Into<String>) -> Self {
        Self {
            severity: kind.default_severity(),
            kind,
            option: None,
            source,
            message: message.into(),
        }
    }

    pub fn for_option(mut self, name: &str) -> Self {
        self.option = Some(name.to_string());
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }

    pub(crate) fn unknown_option(token: &str, source: Rank) -> Self {
        Self::new(
            DiagnosticKind::UnknownOption,
            source,
            format!("unknown option '{token}'"),
        )
    }

    pub(crate) fn missing_value(name: &str, token: &str, source: Rank) -> Self {
        Self::new(
            DiagnosticKind::MissingValue,
            source,
            format!("option '{token}' requires a value"),
        )
        .for_option(name)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.source)
    }
}
