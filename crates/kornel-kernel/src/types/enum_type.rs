//! Enumeration type descriptors.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Most values an enumeration may hold; ordinals fit a `u16`.
pub const MAX_VALUES: usize = u16::MAX as usize;

/// Errors from declaring an enumeration type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnumError {
    #[error("{0} must name an array containing at least two elements")]
    TooFewValues(String),

    #[error("{name}: duplicate value {value}")]
    DuplicateValue { name: String, value: String },

    #[error("{name}: too many values ({count}, limit {MAX_VALUES})")]
    TooManyValues { name: String, count: usize },

    #[error("enum name must not be empty")]
    EmptyName,
}

/// A declared enumeration: a name and an ordered list of distinct values.
///
/// `values[0]` is the default. The descriptor never changes after
/// construction; redeclaring a type builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDescriptor {
    name: String,
    values: Vec<String>,
    #[serde(rename = "ignorecase")]
    case_insensitive: bool,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, values: Vec<String>, case_insensitive: bool) -> Result<Self, EnumError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EnumError::EmptyName);
        }
        if values.len() < 2 {
            return Err(EnumError::TooFewValues(name));
        }
        if values.len() > MAX_VALUES {
            return Err(EnumError::TooManyValues { name, count: values.len() });
        }
        let mut seen = HashSet::with_capacity(values.len());
        for value in &values {
            let key = if case_insensitive { value.to_ascii_lowercase() } else { value.clone() };
            if !seen.insert(key) {
                return Err(EnumError::DuplicateValue {
                    name,
                    value: value.clone(),
                });
            }
        }
        Ok(Self {
            name,
            values,
            case_insensitive,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// The value a fresh variable starts with.
    pub fn default_value(&self) -> &str {
        &self.values[0]
    }

    /// Ordinal of `text`, first match wins.
    pub fn ordinal_of(&self, text: &str) -> Option<u16> {
        self.values
            .iter()
            .position(|v| same(v, text, self.case_insensitive))
            .and_then(|i| u16::try_from(i).ok())
    }

    /// Value at `ordinal`, if in range.
    pub fn value_at(&self, ordinal: u16) -> Option<&str> {
        self.values.get(usize::from(ordinal)).map(String::as_str)
    }
}

fn same(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive { a.eq_ignore_ascii_case(b) } else { a == b }
}
