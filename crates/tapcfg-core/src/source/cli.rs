//! Command-line reader
//!
//! Tokens are read left to right:
//! - `--name`, `--name=value`, `--name value` and `--no-name`
//! - `-x` short forms, including multi-character ones such as `-cov`
//! - GNU-style groups: `-bCRspec` is `-b -C -R spec` when `-R` takes a value
//! - `--` ends option parsing; everything after it is positional
//!
//! Alias options are emitted as ordinary assignments; the resolver expands
//! them at their position in the stream.

use super::{Rank, RawAssignment, RawValue};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::option::{OptionDef, Registry};

/// Result of reading one token list
#[derive(Debug, Clone, Default)]
pub struct CliOutput {
    pub assignments: Vec<RawAssignment>,
    /// Non-option tokens, in order (file arguments for the caller)
    pub positionals: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read the process argument vector (without the program name)
pub fn parse_cli<S: AsRef<str>>(registry: &Registry, args: &[S]) -> CliOutput {
    parse_tokens(registry, args, Rank::Cli)
}

/// Read a token list at the given rank; also used for alias expansions.
pub(crate) fn parse_tokens<S: AsRef<str>>(registry: &Registry, tokens: &[S], rank: Rank) -> CliOutput {
    let mut parser = TokenParser {
        registry,
        rank,
        out: CliOutput::default(),
    };
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    let mut rest = tokens.iter().copied();
    while let Some(token) = rest.next() {
        if token == "--" {
            parser.out.positionals.extend(rest.by_ref().map(str::to_string));
            break;
        }
        if let Some(long) = token.strip_prefix("--") {
            parser.long(token, long, &mut rest);
        } else if token.len() > 1 && token.starts_with('-') {
            parser.short(token, &token[1..], &mut rest);
        } else {
            parser.out.positionals.push(token.to_string());
        }
    }
    parser.out
}

struct TokenParser<'r> {
    registry: &'r Registry,
    rank: Rank,
    out: CliOutput,
}

impl TokenParser<'_> {
    fn long<'t>(&mut self, token: &str, body: &str, rest: &mut impl Iterator<Item = &'t str>) {
        let registry = self.registry;
        let (name, attached) = split_attached(body);

        if let Some(def) = registry
            .lookup(name)
            .filter(|def| !def.kind.is_env_only())
        {
            self.take(def, token, attached, rest);
            return;
        }
        if let Some(def) = name
            .strip_prefix("no-")
            .and_then(|base| registry.lookup(base))
            .filter(|def| def.kind.is_flag() && !def.kind.is_env_only())
        {
            self.negate(def, token, attached);
            return;
        }
        self.out
            .diagnostics
            .push(Diagnostic::unknown_option(token, self.rank));
    }

    fn short<'t>(&mut self, token: &str, body: &str, rest: &mut impl Iterator<Item = &'t str>) {
        let registry = self.registry;
        let (head, attached) = split_attached(body);
        if let Some(m) = registry.lookup_by_short(head) {
            if m.negated {
                self.negate(m.def, token, attached);
            } else {
                self.take(m.def, token, attached, rest);
            }
            return;
        }

        for (i, ch) in body.char_indices() {
            let end = i + ch.len_utf8();
            let key = &body[i..end];
            let Some(m) = registry.lookup_by_short(key) else {
                self.out
                    .diagnostics
                    .push(Diagnostic::unknown_option(&format!("-{key}"), self.rank));
                continue;
            };
            if m.negated {
                self.push(m.def, RawValue::Switch(false));
                continue;
            }
            if !m.def.kind.takes_value() {
                self.push(m.def, RawValue::Switch(true));
                continue;
            }
            // A value-taking short ends the group; the remainder is its value.
            let tail = &body[end..];
            let tail = tail.strip_prefix('=').unwrap_or(tail);
            let flag = format!("-{key}");
            let attached = (!tail.is_empty()).then_some(tail);
            self.take(m.def, &flag, attached, rest);
            return;
        }
    }

    fn take<'t>(
        &mut self,
        def: &OptionDef,
        token: &str,
        attached: Option<&str>,
        rest: &mut impl Iterator<Item = &'t str>,
    ) {
        if !def.kind.takes_value() {
            let value = match attached {
                Some(v) => RawValue::Text(v.to_string()),
                None => RawValue::Switch(true),
            };
            self.push(def, value);
            return;
        }
        match attached.or_else(|| rest.next()) {
            Some(value) => self.push(def, RawValue::Text(value.to_string())),
            None => self
                .out
                .diagnostics
                .push(Diagnostic::missing_value(&def.name, token, self.rank)),
        }
    }

    fn negate(&mut self, def: &OptionDef, token: &str, attached: Option<&str>) {
        if attached.is_some() {
            self.out.diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::InvalidValue,
                    self.rank,
                    format!("option '{token}' does not take a value"),
                )
                .for_option(&def.name),
            );
            return;
        }
        self.push(def, RawValue::Switch(false));
    }

    fn push(&mut self, def: &OptionDef, value: RawValue) {
        self.out
            .assignments
            .push(RawAssignment::new(&def.name, value, self.rank));
    }
}

fn split_attached(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}
