//! The declaration command generated for every enum type.
//!
//! `Color c=green` creates `c` with the `Color` discipline attached.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use kornel_types::{ExecResult, Value};

use crate::interpreter::{Assignment, VarAttrs, VarError, Variable, is_identifier};
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use crate::types::TypeEntry;

/// Declaration command for one type, dispatched by type name.
pub struct TypedDeclare {
    type_name: String,
}

impl TypedDeclare {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

#[async_trait]
impl Tool for TypedDeclare {
    fn name(&self) -> &str {
        &self.type_name
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(self.type_name.as_str(), format!("Create variables of type {}", self.type_name))
            .param(ParamSchema::optional("names", "array", Value::Null, "name[=value] operands"))
            .param(
                ParamSchema::optional("readonly", "bool", Value::Bool(false), "Value cannot be changed or unset")
                    .with_aliases(["-r"]),
            )
            .param(
                ParamSchema::optional("indexed", "bool", Value::Bool(false), "Indexed array of this type")
                    .with_aliases(["-a"]),
            )
            .param(
                ParamSchema::optional("assoc", "bool", Value::Bool(false), "Associative array of this type")
                    .with_aliases(["-A"]),
            )
            .param(
                ParamSchema::optional("help_text", "string", Value::Null, "Help string for the variable")
                    .with_aliases(["-h"]),
            )
            .param(
                ParamSchema::optional("static", "bool", Value::Bool(false), "Shared by each instance")
                    .with_aliases(["-S"]),
            )
            .param(ParamSchema::optional("usage", "bool", Value::Bool(false), "Describe this type").with_aliases(["--help"]))
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let Some(entry) = ctx.scope.types().get(&self.type_name).cloned() else {
            return ExecResult::failure(127, format!("{}: not found", self.type_name));
        };
        if args.has_flag("usage") {
            return ExecResult::success(entry.info().usage(&self.type_name));
        }
        if args.has_flag("indexed") && args.has_flag("assoc") {
            return ExecResult::failure(2, format!("{}: -a and -A are mutually exclusive", self.type_name));
        }

        let operands = args.positional_strings();
        if operands.is_empty() {
            return list_instances(ctx, &entry);
        }

        let mut err = String::new();
        let mut code = 0;
        for operand in &operands {
            if let Err(e) = declare(ctx, &entry, &args, operand) {
                err.push_str(&format!("{}: {e}\n", self.type_name));
                code = 1;
                if e.is_fatal() {
                    ctx.abort = true;
                    break;
                }
            }
        }
        ExecResult::from_output(code, "", err)
    }
}

fn declare(ctx: &mut ExecContext, entry: &TypeEntry, args: &ToolArgs, operand: &str) -> Result<(), VarError> {
    let (name, value) = match operand.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (operand, None),
    };
    if !is_identifier(name) {
        return Err(VarError::NoSuchVariable(name.to_string()));
    }
    let shared = args.has_flag("static");

    let existing = match ctx.scope.get(name) {
        Some(var) if var.is_readonly() => return Err(VarError::ReadOnly(name.to_string())),
        Some(var) if !shared && value.is_none() => existing_elements(var),
        _ => Vec::new(),
    };

    let mut var = entry.discipline().instance(name, None)?;
    if shared {
        var.add_attrs(VarAttrs::NOFREE | VarAttrs::STATIC);
    }
    if args.has_flag("indexed") {
        var.set_raw(Value::Array(Vec::new()));
    } else if args.has_flag("assoc") {
        var.set_raw(Value::Assoc(BTreeMap::new()));
    }

    match value {
        Some(text) => var.assign(Assignment::Text(text))?,
        None => match existing.as_slice() {
            [] => {}
            [(key, text)] if key == "0" && !var.value().is_array() => var.assign(Assignment::Text(text))?,
            elements => {
                for (key, text) in elements {
                    var.assign_element(key, Assignment::Text(text))?;
                }
            }
        },
    }

    if let Some(help) = args.get_string("help_text", usize::MAX) {
        var.set_help(help);
    }
    if args.has_flag("readonly") {
        var.add_attrs(VarAttrs::READONLY);
    }
    debug!(name, type_name = entry.name(), "typed variable declared");
    ctx.scope.declare(var);
    Ok(())
}

/// `(subscript, text)` pairs of a variable's current value.
fn existing_elements(var: &Variable) -> Vec<(String, String)> {
    match var.value() {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .filter_map(|(i, _)| Some((i.to_string(), var.get_element(&i.to_string()).ok()?)))
            .collect(),
        Value::Assoc(map) => map
            .keys()
            .filter_map(|k| Some((k.clone(), var.get_element(k).ok()?)))
            .collect(),
        _ => vec![("0".to_string(), var.get())],
    }
}

fn list_instances(ctx: &ExecContext, entry: &TypeEntry) -> ExecResult {
    let mut out = String::new();
    for var in ctx.scope.vars_of_type(entry.name()) {
        let rendered = match var.value() {
            // holes force explicit subscripts so the listing reads back the same
            Value::Array(items) if items.iter().any(Value::is_null) => {
                let pairs: Vec<String> = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| !item.is_null())
                    .map(|(i, _)| format!("[{i}]={}", var.get_element(&i.to_string()).unwrap_or_default()))
                    .collect();
                format!("({})", pairs.join(" "))
            }
            Value::Array(_) => format!("({})", var.elements().join(" ")),
            Value::Assoc(map) => {
                let pairs: Vec<String> = map
                    .keys()
                    .map(|k| format!("[{k}]={}", var.get_element(k).unwrap_or_default()))
                    .collect();
                format!("({})", pairs.join(" "))
            }
            _ => var.get(),
        };
        out.push_str(&format!("{}={rendered}\n", var.name()));
    }
    ExecResult::success(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::argv::parse_args;
    use crate::types::EnumDescriptor;
    use crate::vfs::MemoryFs;
    use std::sync::Arc;

    fn make_ctx() -> ExecContext {
        let mut ctx = ExecContext::new(Arc::new(MemoryFs::new()));
        let values = ["red", "green", "blue"].iter().map(|s| s.to_string()).collect();
        ctx.scope
            .types_mut()
            .register(EnumDescriptor::new("Color", values, false).unwrap());
        ctx
    }

    async fn run(ctx: &mut ExecContext, argv: &[&str]) -> ExecResult {
        let tool = TypedDeclare::new("Color");
        let words: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let args = parse_args(&words, &tool.schema()).unwrap();
        tool.execute(args, ctx).await
    }

    #[tokio::test]
    async fn declare_with_value_and_default() {
        let mut ctx = make_ctx();
        assert!(run(&mut ctx, &["c=green", "d"]).await.ok());
        assert_eq!(ctx.scope.get_string("c").as_deref(), Some("green"));
        assert_eq!(ctx.scope.get_string("d").as_deref(), Some("red"));
        assert_eq!(ctx.scope.get("c").unwrap().type_name(), Some("Color"));
    }

    #[tokio::test]
    async fn invalid_value_is_reported() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, &["c=purple", "d=blue"]).await;
        assert_eq!(result.code, 1);
        assert_eq!(result.err, "Color: c: invalid value purple\n");
        assert!(!ctx.scope.contains("c"));
        assert_eq!(ctx.scope.get_string("d").as_deref(), Some("blue"));
        assert!(!ctx.abort);
    }

    #[tokio::test]
    async fn static_makes_invalid_writes_fatal() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, &["-S", "c=purple", "d=blue"]).await;
        assert_eq!(result.code, 1);
        assert!(ctx.abort);
        assert!(!ctx.scope.contains("d"));

        let mut ctx = make_ctx();
        run(&mut ctx, &["-S", "c=blue"]).await;
        let var = ctx.scope.get("c").unwrap();
        assert!(var.attrs().contains(VarAttrs::NOFREE | VarAttrs::STATIC));
    }

    #[tokio::test]
    async fn existing_value_is_kept_when_valid() {
        let mut ctx = make_ctx();
        ctx.scope.set("c", Value::String("blue".into()));
        ctx.scope.set("x", Value::String("teal".into()));
        assert!(run(&mut ctx, &["c"]).await.ok());
        assert_eq!(ctx.scope.get_string("c").as_deref(), Some("blue"));
        assert_eq!(run(&mut ctx, &["x"]).await.code, 1);
    }

    #[tokio::test]
    async fn arrays() {
        let mut ctx = make_ctx();
        ctx.scope.set("c", Value::String("green".into()));
        assert!(run(&mut ctx, &["-a", "c"]).await.ok());
        let var = ctx.scope.get("c").unwrap();
        assert_eq!(var.get_element("0").unwrap(), "green");

        ctx.scope
            .assign_array("m", &["[fg]=blue".to_string(), "[bg]=red".to_string()])
            .unwrap();
        assert!(run(&mut ctx, &["-A", "m"]).await.ok());
        let var = ctx.scope.get("m").unwrap();
        assert_eq!(var.get_element("fg").unwrap(), "blue");
        assert_eq!(var.child("green").unwrap().get(), "1");

        assert_eq!(run(&mut ctx, &["-a", "-A", "z"]).await.code, 2);
    }

    #[tokio::test]
    async fn readonly_and_help() {
        let mut ctx = make_ctx();
        run(&mut ctx, &["-r", "-h", "paint colour", "c=blue"]).await;
        let var = ctx.scope.get("c").unwrap();
        assert!(var.is_readonly());
        assert_eq!(var.help(), Some("paint colour"));
        let result = run(&mut ctx, &["c=red"]).await;
        assert_eq!(result.err, "Color: c: is read only\n");
    }

    #[tokio::test]
    async fn lists_instances() {
        let mut ctx = make_ctx();
        run(&mut ctx, &["b=blue", "a=green"]).await;
        run(&mut ctx, &["-a", "arr"]).await;
        ctx.scope.assign_element("arr", "1", Assignment::Text("red")).unwrap();
        ctx.scope.set("plain", Value::String("red".into()));
        let result = run(&mut ctx, &[]).await;
        assert_eq!(result.out, "a=green\narr=([1]=red)\nb=blue\n");
    }

    #[tokio::test]
    async fn array_listing_marks_holes() {
        let mut ctx = make_ctx();
        run(&mut ctx, &["-a", "arr"]).await;
        ctx.scope.assign_element("arr", "0", Assignment::Text("blue")).unwrap();
        ctx.scope.assign_element("arr", "1", Assignment::Text("green")).unwrap();
        ctx.scope.assign_element("arr", "3", Assignment::Text("red")).unwrap();
        let result = run(&mut ctx, &[]).await;
        assert_eq!(result.out, "arr=([0]=blue [1]=green [3]=red)\n");
        ctx.scope.assign_element("arr", "2", Assignment::Text("red")).unwrap();
        let result = run(&mut ctx, &[]).await;
        assert_eq!(result.out, "arr=(blue green red red)\n");
    }

    #[tokio::test]
    async fn usage_text() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, &["--help"]).await;
        assert!(result.out.starts_with("Usage: Color [-r] [-a|-A] [-h string] [-S] [name[=value]...]"));
        assert!(result.out.contains("one of the following values, red, green, blue."));
        assert!(result.out.contains("the default is red."));
    }
}
