//! Variable scope management.
//!
//! Scopes provide variable bindings with:
//! - Nested scope frames (push/pop)
//! - The special `$?` variable tracking the last command result
//! - Path resolution for dotted and subscripted access (`${c.blue}`, `${a[1]}`)
//! - The table of declared types

use std::collections::{BTreeMap, HashMap};

use kornel_types::{ExecResult, Value};

use super::path::{VarPath, VarSegment};
use super::variable::{Assignment, VarError, Variable};
use crate::types::TypeTable;

/// Variable scope with nested frames, last-result tracking and types.
///
/// Variables are looked up from innermost to outermost frame.
#[derive(Debug, Clone)]
pub struct Scope {
    /// Stack of variable frames. Last element is the innermost scope.
    frames: Vec<HashMap<String, Variable>>,
    /// The result of the last command execution.
    last_result: ExecResult,
    types: TypeTable,
}

impl Scope {
    /// Create a new scope with one empty frame and the built-in types.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
            last_result: ExecResult::default(),
            types: TypeTable::new(),
        }
    }

    /// Push a new scope frame.
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pop the innermost scope frame. The root frame stays.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Insert a variable into the current (innermost) frame, replacing any
    /// binding of the same name there.
    pub fn declare(&mut self, var: Variable) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(var.name().to_string(), var);
        }
    }

    /// Get a variable by name, searching from innermost to outermost frame.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.frames.iter_mut().rev().find_map(|frame| frame.get_mut(name))
    }

    /// Check if a variable exists in any frame.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Plain value of a variable, as its string form.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(Variable::get)
    }

    /// Set a plain variable, bypassing disciplines. Used for tests and
    /// for values the kernel computes itself.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(var) => var.set_raw(value),
            None => self.declare(Variable::new(name, value)),
        }
    }

    /// `NAME=value` through the variable's discipline.
    pub fn assign(&mut self, name: &str, value: Assignment<'_>) -> Result<(), VarError> {
        match self.get_mut(name) {
            Some(var) => var.assign(value),
            None => {
                let mut var = Variable::new(name, Value::Null);
                var.assign(value)?;
                self.declare(var);
                Ok(())
            }
        }
    }

    /// `NAME[SUB]=value` through the variable's discipline.
    pub fn assign_element(&mut self, name: &str, subscript: &str, value: Assignment<'_>) -> Result<(), VarError> {
        match self.get_mut(name) {
            Some(var) => var.assign_element(subscript, value),
            None => {
                let mut var = Variable::new(name, Value::Null);
                var.assign_element(subscript, value)?;
                self.declare(var);
                Ok(())
            }
        }
    }

    /// `NAME=(a b c)` or `NAME=([k]=v ...)`.
    ///
    /// The old elements are dropped; each new element is written through the
    /// variable's discipline, so typed arrays validate their members.
    pub fn assign_array(&mut self, name: &str, items: &[String]) -> Result<(), VarError> {
        let keyed: Option<Vec<(&str, &str)>> = if items.is_empty() {
            None
        } else {
            items.iter().map(|item| split_keyed(item)).collect()
        };
        if !self.contains(name) {
            self.declare(Variable::new(name, Value::Null));
        }
        let var = self
            .get_mut(name)
            .ok_or_else(|| VarError::NoSuchVariable(name.to_string()))?;
        if var.is_readonly() {
            return Err(VarError::ReadOnly(name.to_string()));
        }
        match keyed {
            Some(pairs) => {
                var.set_raw(Value::Assoc(BTreeMap::new()));
                for (key, value) in pairs {
                    var.assign_element(key, Assignment::Text(value))?;
                }
            }
            None => {
                var.set_raw(Value::Array(Vec::new()));
                for (i, item) in items.iter().enumerate() {
                    var.assign_element(&i.to_string(), Assignment::Text(item))?;
                }
            }
        }
        Ok(())
    }

    /// Remove a variable, honouring readonly and detaching its discipline.
    pub fn unset(&mut self, name: &str) -> Result<Option<Variable>, VarError> {
        let Some(var) = self.get_mut(name) else {
            return Ok(None);
        };
        var.unset()?;
        Ok(self.remove(name))
    }

    /// Remove a variable, searching from innermost to outermost frame.
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.frames.iter_mut().rev().find_map(|frame| frame.remove(name))
    }

    /// Set the last command result (accessible via `$?`).
    pub fn set_last_result(&mut self, result: ExecResult) {
        self.last_result = result;
    }

    /// Get the last command result.
    pub fn last_result(&self) -> &ExecResult {
        &self.last_result
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    /// Variables bound to `type_name`, sorted by name.
    pub fn vars_of_type(&self, type_name: &str) -> Vec<&Variable> {
        let mut seen = HashMap::new();
        for frame in &self.frames {
            for (name, var) in frame {
                seen.insert(name.as_str(), var);
            }
        }
        let mut vars: Vec<&Variable> = seen
            .into_values()
            .filter(|var| var.type_name() == Some(type_name))
            .collect();
        vars.sort_by(|a, b| a.name().cmp(b.name()));
        vars
    }

    /// Resolve `${path}` to its string form. Unknown variables are empty.
    pub fn resolve_path(&self, path: &VarPath) -> Result<String, VarError> {
        let root = path.root();
        if root == "?" {
            return Ok(self.resolve_result_path(&path.segments[1..]));
        }
        let Some(var) = self.get(root) else {
            return Ok(String::new());
        };
        match &path.segments[1..] {
            [] => Ok(var.get()),
            [VarSegment::Index(sub)] => var.get_element(sub),
            [VarSegment::Field(symbol)] => Ok(var.child(symbol)?.get()),
            // elements share the array's discipline
            [VarSegment::Index(_), VarSegment::Field(symbol)] => Ok(var.child(symbol)?.get()),
            _ => Err(VarError::NoSuchVariable(path_text(path))),
        }
    }

    /// `$?` alone is the exit code; `${?.out}` and friends read fields.
    fn resolve_result_path(&self, segments: &[VarSegment]) -> String {
        match segments {
            [VarSegment::Field(field)] => self
                .last_result
                .get_field(field)
                .map(|v| super::expand::value_to_string(&v))
                .unwrap_or_default(),
            _ => self.last_result.code.to_string(),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// `[key]=value` split into its parts.
fn split_keyed(item: &str) -> Option<(&str, &str)> {
    let rest = item.strip_prefix('[')?;
    let (key, value) = rest.split_once("]=")?;
    Some((key, value))
}

fn path_text(path: &VarPath) -> String {
    let mut text = String::new();
    for segment in &path.segments {
        match segment {
            VarSegment::Field(name) if text.is_empty() => text.push_str(name),
            VarSegment::Field(name) => {
                text.push('.');
                text.push_str(name);
            }
            VarSegment::Index(sub) => {
                text.push('[');
                text.push_str(sub);
                text.push(']');
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scope_has_one_frame() {
        let scope = Scope::new();
        assert_eq!(scope.frames.len(), 1);
    }

    #[test]
    fn set_and_get_variable() {
        let mut scope = Scope::new();
        scope.set("X", Value::Int(42));
        assert_eq!(scope.get_string("X"), Some("42".into()));
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut scope = Scope::new();
        scope.set("X", Value::Int(1));
        scope.push_frame();
        scope.declare(Variable::new("X", Value::Int(2)));
        assert_eq!(scope.get_string("X"), Some("2".into()));
        scope.pop_frame();
        assert_eq!(scope.get_string("X"), Some("1".into()));
        scope.pop_frame();
        assert!(scope.contains("X"));
    }

    #[test]
    fn assign_creates_plain_variable() {
        let mut scope = Scope::new();
        scope.assign("greeting", Assignment::Text("hi")).unwrap();
        assert_eq!(scope.get_string("greeting"), Some("hi".into()));
        assert_eq!(scope.get("greeting").and_then(|v| v.type_name()), None);
    }

    #[test]
    fn readonly_blocks_assign_and_unset() {
        let mut scope = Scope::new();
        let mut var = Variable::new("R", Value::String("x".into()));
        var.add_attrs(super::super::variable::VarAttrs::READONLY);
        scope.declare(var);
        assert_eq!(scope.assign("R", Assignment::Text("y")), Err(VarError::ReadOnly("R".into())));
        assert!(scope.unset("R").is_err());
        assert!(scope.contains("R"));
    }

    #[test]
    fn indexed_and_keyed_arrays() {
        let mut scope = Scope::new();
        scope.assign_array("a", &["x".into(), "y".into(), "z".into()]).unwrap();
        assert_eq!(scope.get("a").map(|v| v.value().len()), Some(3));
        assert_eq!(scope.resolve_path(&VarPath::parse("a[1]").unwrap()), Ok("y".into()));
        assert_eq!(scope.resolve_path(&VarPath::parse("a[@]").unwrap()), Ok("x y z".into()));
        assert_eq!(scope.resolve_path(&VarPath::simple("a")), Ok("x".into()));

        scope.assign_array("m", &["[k]=v".into(), "[j]=w".into()]).unwrap();
        assert_eq!(scope.resolve_path(&VarPath::parse("m[k]").unwrap()), Ok("v".into()));
    }

    #[test]
    fn resolve_last_result() {
        let mut scope = Scope::new();
        scope.set_last_result(ExecResult::failure(127, "not found"));
        assert_eq!(scope.resolve_path(&VarPath::simple("?")), Ok("127".into()));
        assert_eq!(scope.resolve_path(&VarPath::parse("?.err").unwrap()), Ok("not found".into()));
    }

    #[test]
    fn unknown_variable_is_empty() {
        let scope = Scope::new();
        assert_eq!(scope.resolve_path(&VarPath::simple("nope")), Ok(String::new()));
    }

    #[test]
    fn dotted_access_on_plain_variable_fails() {
        let mut scope = Scope::new();
        scope.set("p", Value::String("x".into()));
        assert!(matches!(
            scope.resolve_path(&VarPath::parse("p.q").unwrap()),
            Err(VarError::NoSuchVariable(_))
        ));
    }
}
