//! The enum discipline: string reads and writes over an ordinal slot.

use kornel_types::Value;
use tracing::trace;

use super::enum_type::EnumDescriptor;
use crate::interpreter::{Assignment, Discipline, VarAttrs, VarError, Variable, WriteOutcome};

/// Discipline attached to every variable of an enum type.
///
/// Each variable owns its own copy of the descriptor; cloning a variable
/// clones the descriptor with it.
#[derive(Debug, Clone)]
pub struct EnumDiscipline {
    descriptor: EnumDescriptor,
}

impl EnumDiscipline {
    pub fn new(descriptor: EnumDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        &self.descriptor
    }

    /// A new variable of this type, holding `initial` or the default.
    pub fn instance(&self, name: &str, initial: Option<&str>) -> Result<Variable, VarError> {
        let mut var = Variable::new(name, Value::Null);
        var.push_discipline(self.clone_box());
        match initial {
            Some(text) => var.assign(Assignment::Text(text))?,
            None => var.assign(Assignment::Integer(0))?,
        }
        Ok(var)
    }

    fn slot_ordinal(slot: &Value) -> Option<i64> {
        match slot {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl Discipline for EnumDiscipline {
    fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    fn write(&self, name: &str, slot: &mut Value, attrs: VarAttrs, value: Assignment<'_>) -> Result<WriteOutcome, VarError> {
        match value {
            Assignment::Unset => {
                *slot = Value::Null;
                Ok(WriteOutcome::Detach)
            }
            Assignment::Integer(n) => {
                *slot = Value::Int(i64::from(n as u16));
                Ok(WriteOutcome::Stored)
            }
            Assignment::Text(text) => match self.descriptor.ordinal_of(text) {
                Some(ordinal) => {
                    trace!(name, text, ordinal, "enum write");
                    *slot = Value::Int(i64::from(ordinal));
                    Ok(WriteOutcome::Stored)
                }
                None => Err(VarError::InvalidValue {
                    name: name.to_string(),
                    value: text.to_string(),
                    fatal: attrs.contains(VarAttrs::NOFREE),
                }),
            },
        }
    }

    fn read(&self, slot: &Value) -> String {
        let Some(n) = Self::slot_ordinal(slot) else {
            return match slot {
                Value::String(s) => s.clone(),
                _ => String::new(),
            };
        };
        u16::try_from(n)
            .ok()
            .and_then(|ordinal| self.descriptor.value_at(ordinal))
            .map(str::to_string)
            .unwrap_or_else(|| n.to_string())
    }

    fn numeric_read(&self, slot: &Value) -> f64 {
        Self::slot_ordinal(slot).unwrap_or(0) as f64
    }

    fn clone_box(&self) -> Box<dyn Discipline> {
        Box::new(self.clone())
    }

    fn lookup_child(&self, owner: &str, name: &str) -> Result<Variable, VarError> {
        match self.descriptor.ordinal_of(name) {
            Some(ordinal) => Ok(Variable::new(name, Value::Int(i64::from(ordinal)))),
            None => Err(VarError::InvalidEnumConstant {
                name: owner.to_string(),
                symbol: name.to_string(),
            }),
        }
    }
}
