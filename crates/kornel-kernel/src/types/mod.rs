//! Declared variable types.
//!
//! The type table maps type names to their enum discipline and help
//! metadata. `_Bool` (alias `bool`) is always present.

pub mod discipline;
pub mod emit;
pub mod enum_type;
pub mod registrar;

use std::collections::BTreeMap;

pub use discipline::EnumDiscipline;
pub use emit::{emit, emit_descriptor, emit_json};
pub use enum_type::{EnumDescriptor, EnumError, MAX_VALUES};
pub use registrar::{TypeEntry, TypeInfo};

/// Namespace prefix under which type nodes are registered.
pub const TYPE_NAMESPACE: &str = ".sh.type";

/// Built-in boolean enumeration.
pub const BOOL_TYPE: &str = "_Bool";

/// Declared types in declaration order.
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    aliases: BTreeMap<String, String>,
}

impl TypeTable {
    /// A table holding only `_Bool` and its alias `bool`.
    pub fn new() -> Self {
        let mut table = Self {
            entries: Vec::new(),
            aliases: BTreeMap::new(),
        };
        let values = vec!["false".to_string(), "true".to_string()];
        if let Ok(descriptor) = EnumDescriptor::new(BOOL_TYPE, values, false) {
            table.register(descriptor);
        }
        table.alias("bool", BOOL_TYPE);
        table
    }

    /// Make `alias` another name for `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Look up a type by name or alias.
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        let name = self.resolve(name);
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Types in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter()
    }

    /// Type names and aliases, for command dispatch.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.name().to_string())
            .chain(self.aliases.keys().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace, keeping the original position on replace.
    /// A declared type hides any alias of the same name.
    fn insert(&mut self, entry: TypeEntry) -> &TypeEntry {
        self.aliases.remove(entry.name());
        let index = match self.entries.iter().position(|e| e.name() == entry.name()) {
            Some(index) => {
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
