//! Shell variables: a value slot, attribute flags and a discipline stack.
//!
//! A discipline intercepts reads and writes of the slot. Typed variables
//! (enumerations) carry one; plain variables carry none and store what
//! they are given.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

use kornel_types::Value;

use super::expand::value_to_string;

bitflags! {
    /// Variable attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VarAttrs: u8 {
        /// Writes and unset fail.
        const READONLY = 1;
        /// Storage must not be released; invalid writes are fatal.
        const NOFREE = 1 << 1;
        /// Shared by every instance of a type (`-S`).
        const STATIC = 1 << 2;
    }
}

/// Errors from reading or writing variables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VarError {
    #[error("{0}: is read only")]
    ReadOnly(String),

    #[error("{name}: invalid value {value}")]
    InvalidValue { name: String, value: String, fatal: bool },

    #[error("{symbol}: invalid enum constant for {name}")]
    InvalidEnumConstant { name: String, symbol: String },

    #[error("{0} must name an array containing at least two elements")]
    NotAnArray(String),

    #[error("{0}: no such variable")]
    NoSuchVariable(String),

    #[error("{name}: bad subscript {subscript}")]
    BadSubscript { name: String, subscript: String },
}

impl VarError {
    /// A fatal error stops the rest of the script.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidValue { fatal: true, .. })
    }
}

/// What is being written to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment<'a> {
    /// Unset: clears the slot.
    Unset,
    /// Raw integer, stored without lookup.
    Integer(i64),
    /// A string value.
    Text(&'a str),
}

/// How a discipline handled a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    /// The discipline leaves the variable; pop it.
    Detach,
}

/// Read/write hooks layered over a variable's value slot.
pub trait Discipline: fmt::Debug + Send + Sync {
    /// Name of the type this discipline implements.
    fn type_name(&self) -> &str;

    /// Store `value` into `slot`.
    fn write(&self, name: &str, slot: &mut Value, attrs: VarAttrs, value: Assignment<'_>) -> Result<WriteOutcome, VarError>;

    /// String form of `slot`.
    fn read(&self, slot: &Value) -> String;

    /// Arithmetic form of `slot`.
    fn numeric_read(&self, slot: &Value) -> f64;

    /// Deep copy for a new variable.
    fn clone_box(&self) -> Box<dyn Discipline>;

    /// Resolve `owner.name`.
    fn lookup_child(&self, owner: &str, name: &str) -> Result<Variable, VarError>;
}

/// A named variable.
#[derive(Debug)]
pub struct Variable {
    name: String,
    value: Value,
    attrs: VarAttrs,
    help: Option<String>,
    disciplines: Vec<Box<dyn Discipline>>,
}

impl Clone for Variable {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
            attrs: self.attrs,
            help: self.help.clone(),
            disciplines: self.disciplines.iter().map(|d| d.clone_box()).collect(),
        }
    }
}

impl Variable {
    /// A plain variable holding `value`.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            attrs: VarAttrs::empty(),
            help: None,
            disciplines: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw slot, bypassing any discipline.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the raw slot, bypassing any discipline.
    pub fn set_raw(&mut self, value: Value) {
        self.value = value;
    }

    pub fn attrs(&self) -> VarAttrs {
        self.attrs
    }

    pub fn add_attrs(&mut self, attrs: VarAttrs) {
        self.attrs |= attrs;
    }

    pub fn is_readonly(&self) -> bool {
        self.attrs.contains(VarAttrs::READONLY)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn set_help(&mut self, help: impl Into<String>) {
        self.help = Some(help.into());
    }

    /// The active (topmost) discipline.
    pub fn discipline(&self) -> Option<&dyn Discipline> {
        self.disciplines.last().map(|d| d.as_ref())
    }

    pub fn push_discipline(&mut self, discipline: Box<dyn Discipline>) {
        self.disciplines.push(discipline);
    }

    /// Type name when a discipline is attached.
    pub fn type_name(&self) -> Option<&str> {
        self.discipline().map(|d| d.type_name())
    }

    fn read_slot(&self, slot: &Value) -> String {
        match self.discipline() {
            Some(d) => d.read(slot),
            None => value_to_string(slot),
        }
    }

    /// Scalar read. Arrays read their first element.
    pub fn get(&self) -> String {
        match &self.value {
            Value::Array(items) => items.first().map(|v| self.read_slot(v)).unwrap_or_default(),
            Value::Assoc(map) => map.get("0").map(|v| self.read_slot(v)).unwrap_or_default(),
            scalar => self.read_slot(scalar),
        }
    }

    /// Element read; `@` and `*` join all elements with spaces.
    pub fn get_element(&self, subscript: &str) -> Result<String, VarError> {
        if subscript == "@" || subscript == "*" {
            return Ok(self.elements().join(" "));
        }
        match &self.value {
            Value::Array(items) => {
                let index = self.parse_index(subscript)?;
                Ok(items.get(index).map(|v| self.read_slot(v)).unwrap_or_default())
            }
            Value::Assoc(map) => Ok(map.get(subscript).map(|v| self.read_slot(v)).unwrap_or_default()),
            scalar => {
                if self.parse_index(subscript)? == 0 {
                    Ok(self.read_slot(scalar))
                } else {
                    Ok(String::new())
                }
            }
        }
    }

    /// Every element read through the discipline, in order.
    pub fn elements(&self) -> Vec<String> {
        match &self.value {
            Value::Array(items) => items.iter().filter(|v| !v.is_null()).map(|v| self.read_slot(v)).collect(),
            Value::Assoc(map) => map.values().map(|v| self.read_slot(v)).collect(),
            Value::Null => Vec::new(),
            scalar => vec![self.read_slot(scalar)],
        }
    }

    /// Arithmetic read of the scalar slot.
    pub fn numeric(&self) -> Option<f64> {
        let slot = match &self.value {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            scalar => scalar,
        };
        if let Some(d) = self.discipline() {
            return Some(d.numeric_read(slot));
        }
        match slot {
            Value::Null => Some(0.0),
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) if s.trim().is_empty() => Some(0.0),
            Value::String(s) => s.trim().parse().ok(),
            Value::Array(_) | Value::Assoc(_) => None,
        }
    }

    fn parse_index(&self, subscript: &str) -> Result<usize, VarError> {
        subscript.trim().parse().map_err(|_| VarError::BadSubscript {
            name: self.name.clone(),
            subscript: subscript.to_string(),
        })
    }

    /// Write through the discipline. Arrays write their first element.
    pub fn assign(&mut self, value: Assignment<'_>) -> Result<(), VarError> {
        if self.is_readonly() {
            return Err(VarError::ReadOnly(self.name.clone()));
        }
        if matches!(self.value, Value::Array(_) | Value::Assoc(_)) && value != Assignment::Unset {
            return self.assign_element("0", value);
        }
        let Self {
            name,
            value: slot,
            attrs,
            disciplines,
            ..
        } = self;
        match disciplines.last() {
            Some(d) => {
                if d.write(name, slot, *attrs, value)? == WriteOutcome::Detach {
                    disciplines.pop();
                    *slot = Value::Null;
                }
            }
            None => *slot = plain_value(value),
        }
        Ok(())
    }

    /// Write one element, turning a scalar into an array when needed.
    pub fn assign_element(&mut self, subscript: &str, value: Assignment<'_>) -> Result<(), VarError> {
        if self.is_readonly() {
            return Err(VarError::ReadOnly(self.name.clone()));
        }
        let numeric = subscript.trim().parse::<usize>().ok();
        if !matches!(self.value, Value::Array(_) | Value::Assoc(_)) {
            let current = std::mem::take(&mut self.value);
            self.value = match numeric {
                Some(_) => Value::Array(if current.is_null() { Vec::new() } else { vec![current] }),
                None => {
                    let mut map = std::collections::BTreeMap::new();
                    if !current.is_null() {
                        map.insert("0".to_string(), current);
                    }
                    Value::Assoc(map)
                }
            };
        }
        let Self {
            name,
            value: whole,
            attrs,
            disciplines,
            ..
        } = self;
        let slot = match whole {
            Value::Array(items) => {
                let index = numeric.ok_or_else(|| VarError::BadSubscript {
                    name: name.clone(),
                    subscript: subscript.to_string(),
                })?;
                if items.len() <= index {
                    items.resize(index + 1, Value::Null);
                }
                &mut items[index]
            }
            Value::Assoc(map) => map.entry(subscript.to_string()).or_insert(Value::Null),
            _ => {
                return Err(VarError::BadSubscript {
                    name: name.clone(),
                    subscript: subscript.to_string(),
                });
            }
        };
        match disciplines.last() {
            // an element never detaches the discipline from the whole array
            Some(d) => {
                if d.write(name, slot, *attrs, value)? == WriteOutcome::Detach {
                    *slot = Value::Null;
                }
            }
            None => *slot = plain_value(value),
        }
        Ok(())
    }

    /// Unset through the discipline.
    pub fn unset(&mut self) -> Result<(), VarError> {
        self.assign(Assignment::Unset)
    }

    /// Resolve `name.symbol`.
    pub fn child(&self, symbol: &str) -> Result<Variable, VarError> {
        match self.discipline() {
            Some(d) => d.lookup_child(&self.name, symbol),
            None => Err(VarError::NoSuchVariable(format!("{}.{}", self.name, symbol))),
        }
    }
}

fn plain_value(value: Assignment<'_>) -> Value {
    match value {
        Assignment::Unset => Value::Null,
        Assignment::Integer(n) => Value::Int(n),
        Assignment::Text(s) => Value::String(s.to_string()),
    }
}
