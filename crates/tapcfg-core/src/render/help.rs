//! `--help` output

use crate::option::{OptionDef, OptionValue, Registry, ValueType};
use std::fmt::Write;

const WIDTH: usize = 80;
const LABEL_INDENT: usize = 2;
const TEXT_INDENT: usize = 8;

/// Render usage, general help and every section of the registry.
///
/// Options appear grouped by section in declaration order; alias options
/// list their expansion, negatable flags get their own row.
pub fn render_help(registry: &Registry) -> String {
    let mut out = String::new();
    if let Some(usage) = registry.usage() {
        out.push_str("Usage:\n");
        push_wrapped(&mut out, usage, LABEL_INDENT);
        out.push('\n');
    }
    if let Some(help) = registry.help() {
        push_wrapped(&mut out, help, 0);
        out.push('\n');
    }

    for (index, section) in registry.sections().iter().enumerate() {
        if !section.title.is_empty() {
            let _ = writeln!(out, "{}:\n", section.title);
        }
        if let Some(help) = &section.help {
            push_wrapped(&mut out, help, LABEL_INDENT);
            out.push('\n');
        }
        for def in registry.section_options(index) {
            push_option(&mut out, def);
        }
        for (label, description) in &section.entries {
            push_row(&mut out, label, &[description.clone()]);
        }
    }
    out
}

fn push_option(out: &mut String, def: &OptionDef) {
    let mut notes = vec![def.description.clone()];
    if let Some(tokens) = &def.alias {
        notes.push(format!("Equivalent to: {}", tokens.join(" ")));
    }
    if let Some(valid) = &def.valid_set {
        notes.push(format!("Valid values: {}", valid.join(" ")));
    }
    if let Some(range) = def.valid_range {
        notes.push(format!("Range: {range}"));
    }
    if let Some(default) = shown_default(def) {
        notes.push(format!("Default: {default}"));
    }
    if let Some(var) = &def.env_var
        && !def.kind.is_env_only()
    {
        notes.push(format!("Environment: {var}"));
    }
    push_row(out, &label(def), &notes);

    if let Some(negate) = &def.negate {
        let long = format!("--{}", def.negate_long());
        let label = match &negate.short {
            Some(short) => format!("-{short} {long}"),
            None => long,
        };
        push_row(out, &label, &[negate.description.clone()]);
    }
}

fn label(def: &OptionDef) -> String {
    if def.kind.is_env_only() {
        return match def.value_type() {
            ValueType::Flag => format!("{}=<0|1>", def.name),
            _ => format!("{}=<{}>", def.name, def.hint()),
        };
    }
    let short = def.short.as_deref();
    if def.kind.takes_value() {
        let hint = def.hint();
        match short {
            Some(short) => format!("-{short}<{hint}> --{}=<{hint}>", def.name),
            None => format!("--{}=<{hint}>", def.name),
        }
    } else {
        match short {
            Some(short) => format!("-{short} --{}", def.name),
            None => format!("--{}", def.name),
        }
    }
}

/// Defaults worth printing: not unset, not `false`, not an empty list
fn shown_default(def: &OptionDef) -> Option<String> {
    match def.default.as_ref()? {
        OptionValue::Bool(false) => None,
        OptionValue::List(items) if items.is_empty() => None,
        OptionValue::Str(s) if s.is_empty() => None,
        value => Some(value.to_string()),
    }
}

fn push_row(out: &mut String, label: &str, notes: &[String]) {
    let _ = writeln!(out, "{}{label}", " ".repeat(LABEL_INDENT));
    for note in notes.iter().filter(|n| !n.trim().is_empty()) {
        push_wrapped(out, note, TEXT_INDENT);
    }
    out.push('\n');
}

/// Reflow paragraphs (separated by blank lines) to the help width.
fn push_wrapped(out: &mut String, text: &str, indent: usize) {
    let pad = " ".repeat(indent);
    let limit = WIDTH.saturating_sub(indent).max(20);
    let paragraphs = text.split("\n\n").filter(|p| !p.trim().is_empty());
    for (i, paragraph) in paragraphs.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > limit {
                let _ = writeln!(out, "{pad}{line}");
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            let _ = writeln!(out, "{pad}{line}");
        }
    }
}
