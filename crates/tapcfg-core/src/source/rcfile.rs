//! RC file reader
//!
//! The rc file is a YAML mapping whose keys are option names:
//!
//! ```yaml
//! reporter: spec
//! timeout: 60
//! node-arg:
//!   - --expose-gc
//! ```

use super::{Rank, RawAssignment, RawValue};
use crate::diagnostic::{Diagnostic, DiagnosticKind, ResolveError};
use crate::option::Registry;
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

/// Assignments and warnings produced from one rc file
#[derive(Debug, Clone, Default)]
pub struct RcOutput {
    pub assignments: Vec<RawAssignment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load the rc file at `path`.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// cannot be read or parsed is a fatal error.
pub fn read_rc_file(registry: &Registry, path: &Path) -> Result<Option<RcOutput>, ResolveError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No rc file at {path:?}");
            return Ok(None);
        }
        Err(source) => {
            return Err(ResolveError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    debug!("Loading rc file {path:?}");
    parse_rc_str(registry, &contents, path).map(Some)
}

/// Parse rc file contents; `path` is only used in error messages.
pub fn parse_rc_str(
    registry: &Registry,
    contents: &str,
    path: &Path,
) -> Result<RcOutput, ResolveError> {
    let mut output = RcOutput::default();
    if contents.trim().is_empty() {
        return Ok(output);
    }

    let document: Value =
        serde_yaml::from_str(contents).map_err(|source| ResolveError::RcParse {
            path: path.to_path_buf(),
            source,
        })?;
    let format_error = |message: String| ResolveError::RcFormat {
        path: path.to_path_buf(),
        message,
    };

    let mapping = match document {
        Value::Null => return Ok(output),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(format_error(format!(
                "top-level value is {}",
                describe(&other)
            )));
        }
    };

    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(format_error(format!("key {} is not a name", describe(&other))));
            }
        };
        match registry.lookup(&key) {
            Some(def) => output.assignments.push(RawAssignment::new(
                &def.name,
                RawValue::Yaml(value),
                Rank::RcFile,
            )),
            None => output.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnknownRcKey,
                Rank::RcFile,
                format!("unknown rc file key '{key}' in {}", path.display()),
            )),
        }
    }
    Ok(output)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
