//! Immutable catalog of option definitions

use super::error::DefinitionError;
use super::types::OptionDef;
use std::collections::HashMap;
use tracing::debug;

/// Handle to a defined option (its declaration index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub usize);

/// A titled group of options in help output
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub title: String,
    pub help: Option<String>,
    /// Help-only rows that are not options (e.g. the `--` terminator)
    pub entries: Vec<(String, String)>,
}

/// Result of a short-form lookup
#[derive(Debug, Clone, Copy)]
pub struct ShortMatch<'a> {
    pub def: &'a OptionDef,
    /// The token was the option's negate short form
    pub negated: bool,
}

#[derive(Debug, Clone, Copy)]
struct ShortEntry {
    index: usize,
    negated: bool,
}

/// Builder for a [`Registry`].
///
/// Duplicate names and short forms are rejected as soon as they are
/// defined; alias and implies graphs are checked by [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    usage: Option<String>,
    help: Option<String>,
    rc_option: Option<String>,
    sections: Vec<Section>,
    options: Vec<OptionDef>,
    by_name: HashMap<String, usize>,
    by_short: HashMap<String, ShortEntry>,
}

impl RegistryBuilder {
    pub fn usage(&mut self, usage: &str) -> &mut Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn help(&mut self, help: &str) -> &mut Self {
        self.help = Some(help.to_string());
        self
    }

    /// Name the option whose value is the rc file path
    pub fn rc_file_option(&mut self, name: &str) -> &mut Self {
        self.rc_option = Some(name.to_string());
        self
    }

    /// Start a new section; subsequent definitions belong to it
    pub fn section(&mut self, title: &str, help: Option<&str>) -> &mut Self {
        self.sections.push(Section {
            title: title.to_string(),
            help: help.map(str::to_string),
            entries: Vec::new(),
        });
        self
    }

    /// Add a help-only row to the current section
    pub fn help_entry(&mut self, label: &str, description: &str) -> &mut Self {
        if self.sections.is_empty() {
            self.sections.push(Section::default());
        }
        if let Some(section) = self.sections.last_mut() {
            section
                .entries
                .push((label.to_string(), description.to_string()));
        }
        self
    }

    /// Register a new option definition in the current section
    ///
    /// Returns an error if the name or any short form is already taken.
    pub fn define(&mut self, mut def: OptionDef) -> Result<OptionId, DefinitionError> {
        if self.by_name.contains_key(&def.name) {
            return Err(DefinitionError::DuplicateName(def.name));
        }
        if self.sections.is_empty() {
            self.sections.push(Section::default());
        }
        let index = self.options.len();

        let mut shorts = Vec::new();
        if let Some(short) = &def.short {
            shorts.push((short.clone(), false));
        }
        if let Some(short) = def.negate.as_ref().and_then(|n| n.short.clone()) {
            shorts.push((short, true));
        }
        for (short, _) in &shorts {
            if let Some(existing) = self.by_short.get(short) {
                return Err(DefinitionError::DuplicateShort {
                    short: short.clone(),
                    option: def.name,
                    existing: self.options[existing.index].name.clone(),
                });
            }
        }
        if shorts.len() == 2 && shorts[0].0 == shorts[1].0 {
            return Err(DefinitionError::DuplicateShort {
                short: shorts[0].0.clone(),
                option: def.name.clone(),
                existing: def.name,
            });
        }
        for (short, negated) in shorts {
            self.by_short.insert(short, ShortEntry { index, negated });
        }

        def.section = self.sections.len() - 1;
        debug!("Registered option: {} ({:?})", def.name, def.kind);
        self.by_name.insert(def.name.clone(), index);
        self.options.push(def);
        Ok(OptionId(index))
    }

    /// Freeze the registry after checking alias and implies graphs
    pub fn build(self) -> Result<Registry, DefinitionError> {
        let registry = Registry {
            usage: self.usage,
            help: self.help,
            rc_option: self.rc_option,
            sections: self.sections,
            options: self.options,
            by_name: self.by_name,
            by_short: self.by_short,
        };
        if let Some(name) = &registry.rc_option {
            match registry.lookup(name) {
                Some(def) if def.value_type() == super::ValueType::Str && !def.is_alias() => {}
                _ => {
                    return Err(DefinitionError::Invalid {
                        option: name.clone(),
                        reason: "rc file option must be a registered string option".to_string(),
                    });
                }
            }
        }
        registry.check_aliases()?;
        registry.check_implies()?;
        Ok(registry)
    }
}

/// Read-only registry of option definitions, in declaration order
#[derive(Debug, Clone)]
pub struct Registry {
    usage: Option<String>,
    help: Option<String>,
    rc_option: Option<String>,
    sections: Vec<Section>,
    options: Vec<OptionDef>,
    by_name: HashMap<String, usize>,
    by_short: HashMap<String, ShortEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Get option definition by name
    pub fn lookup(&self, name: &str) -> Option<&OptionDef> {
        self.by_name.get(name).map(|&i| &self.options[i])
    }

    /// Declaration index of an option
    pub fn id_of(&self, name: &str) -> Option<OptionId> {
        self.by_name.get(name).copied().map(OptionId)
    }

    pub fn get(&self, id: OptionId) -> &OptionDef {
        &self.options[id.0]
    }

    /// Get option definition by short form (without the leading dash)
    pub fn lookup_by_short(&self, token: &str) -> Option<ShortMatch<'_>> {
        self.by_short.get(token).map(|entry| ShortMatch {
            def: &self.options[entry.index],
            negated: entry.negated,
        })
    }

    /// All options in declaration order
    pub fn all(&self) -> &[OptionDef] {
        &self.options
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Options declared in the given section, in declaration order
    pub fn section_options(&self, section: usize) -> impl Iterator<Item = &OptionDef> {
        self.options.iter().filter(move |def| def.section == section)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Option holding the rc file path, if any
    pub fn rc_option(&self) -> Option<&OptionDef> {
        self.rc_option.as_deref().and_then(|name| self.lookup(name))
    }

    /// Upper bound on alias nesting and implies passes
    pub fn iteration_cap(&self) -> usize {
        self.options.len() + 1
    }

    /// Options a single alias token refers to.
    ///
    /// Understands `--name[=value]`, `--no-name`, exact short forms and
    /// GNU-style short groups, the same way the command-line reader does.
    fn alias_token_targets(&self, token: &str) -> Option<Vec<usize>> {
        if let Some(long) = token.strip_prefix("--") {
            let name = long.split_once('=').map_or(long, |(name, _)| name);
            if let Some(&index) = self.by_name.get(name) {
                return Some(vec![index]);
            }
            let index = *self.by_name.get(name.strip_prefix("no-")?)?;
            return self.options[index].kind.is_flag().then(|| vec![index]);
        }
        let body = token.strip_prefix('-').filter(|b| !b.is_empty())?;
        let head = body.split_once('=').map_or(body, |(head, _)| head);
        if let Some(entry) = self.by_short.get(head) {
            return Some(vec![entry.index]);
        }

        let mut targets = Vec::new();
        for (i, ch) in body.char_indices() {
            let entry = self.by_short.get(&body[i..i + ch.len_utf8()])?;
            targets.push(entry.index);
            // A value-taking short swallows the rest of the group.
            if !entry.negated && self.options[entry.index].kind.takes_value() {
                break;
            }
        }
        Some(targets)
    }

    fn check_aliases(&self) -> Result<(), DefinitionError> {
        // Depth-first search for cycles: 0 = unvisited, 1 = on stack, 2 = done
        let mut state = vec![0u8; self.options.len()];
        for (index, def) in self.options.iter().enumerate() {
            if def.is_alias() {
                self.visit_alias(index, &mut state)?;
            }
        }
        Ok(())
    }

    fn visit_alias(&self, index: usize, state: &mut [u8]) -> Result<(), DefinitionError> {
        let def = &self.options[index];
        match state[index] {
            1 => return Err(DefinitionError::AliasCycle(def.name.clone())),
            2 => return Ok(()),
            _ => {}
        }
        state[index] = 1;
        for token in def.alias.iter().flatten() {
            let unknown = || DefinitionError::UnknownAliasTarget {
                option: def.name.clone(),
                token: token.clone(),
            };
            let targets = self.alias_token_targets(token).ok_or_else(unknown)?;
            for target in targets {
                let target_def = &self.options[target];
                if target_def.kind.is_env_only() {
                    return Err(unknown());
                }
                if target_def.is_alias() {
                    self.visit_alias(target, state)?;
                }
            }
        }
        state[index] = 2;
        Ok(())
    }

    fn check_implies(&self) -> Result<(), DefinitionError> {
        for def in &self.options {
            for (target, value) in &def.implies {
                let target_def = self
                    .lookup(target)
                    .filter(|t| !t.is_alias())
                    .ok_or_else(|| DefinitionError::UnknownImpliesTarget {
                        option: def.name.clone(),
                        target: target.clone(),
                    })?;
                if value.value_type() != target_def.value_type() {
                    return Err(DefinitionError::ImpliedTypeMismatch {
                        option: def.name.clone(),
                        target: target.clone(),
                        expected: target_def.value_type(),
                        found: value.value_type(),
                    });
                }
            }
        }

        // Depth-first search for cycles: 0 = unvisited, 1 = on stack, 2 = done
        let mut state = vec![0u8; self.options.len()];
        for start in 0..self.options.len() {
            self.visit_implies(start, &mut state)?;
        }
        Ok(())
    }

    fn visit_implies(&self, index: usize, state: &mut [u8]) -> Result<(), DefinitionError> {
        match state[index] {
            1 => return Err(DefinitionError::ImpliesCycle(self.options[index].name.clone())),
            2 => return Ok(()),
            _ => {}
        }
        state[index] = 1;
        for (target, _) in &self.options[index].implies {
            if let Some(&next) = self.by_name.get(target) {
                self.visit_implies(next, state)?;
            }
        }
        state[index] = 2;
        Ok(())
    }
}
