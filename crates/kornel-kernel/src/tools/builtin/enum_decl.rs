//! enum: Declare an enumeration type from an indexed array.

use async_trait::async_trait;
use tracing::debug;

use kornel_types::{ExecResult, Value};

use crate::interpreter::VarError;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use crate::types::{EnumDescriptor, emit, emit_json};

/// Enum tool: turns array `NAME` into type `NAME`, or prints types.
pub struct Enum;

#[async_trait]
impl Tool for Enum {
    fn name(&self) -> &str {
        "enum"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("enum", "Create an enumeration type")
            .param(ParamSchema::optional("name", "string", Value::Null, "Indexed array holding the values"))
            .param(
                ParamSchema::optional("ignorecase", "bool", Value::Bool(false), "Values are case insensitive")
                    .with_aliases(["-i", "--ignorecase"]),
            )
            .param(
                ParamSchema::optional("print", "bool", Value::Bool(false), "Print type definitions")
                    .with_aliases(["-p", "--print"]),
            )
            .param(ParamSchema::optional("json", "bool", Value::Bool(false), "With -p, print as JSON").with_aliases(["--json"]))
            .example("Declare a type", "enum Color=(red green blue)")
            .example("From an existing array", "colors=(red green blue); enum colors")
            .example("Print every type", "enum -p")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let name = args.get_string("name", 0);

        if args.has_flag("print") {
            return print_types(ctx, name.as_deref(), args.has_flag("json"));
        }

        let Some(name) = name else {
            return ExecResult::failure(2, format!("enum: missing type name\n{}", self.schema().usage()));
        };

        let values = match ctx.scope.get(&name) {
            Some(var) if var.discipline().is_none() && matches!(var.value(), Value::Array(_)) => var.elements(),
            _ => Vec::new(),
        };
        if values.len() < 2 {
            return ExecResult::failure(1, format!("enum: {}", VarError::NotAnArray(name)));
        }

        let descriptor = match EnumDescriptor::new(name.as_str(), values, args.has_flag("ignorecase")) {
            Ok(d) => d,
            Err(e) => return ExecResult::failure(1, format!("enum: {e}")),
        };
        let entry = ctx.scope.types_mut().register(descriptor);
        debug!(path = entry.path(), "enum declared");
        ExecResult::success("")
    }
}

fn print_types(ctx: &ExecContext, name: Option<&str>, json: bool) -> ExecResult {
    let types = ctx.scope.types();
    if json {
        return match emit_json(types, name).and_then(|v| serde_json::to_string_pretty(&v).ok()) {
            Some(text) => ExecResult::success(format!("{text}\n")),
            None => ExecResult::failure(1, format!("enum: {}: not an enum type", name.unwrap_or_default())),
        };
    }
    let mut out = String::new();
    match emit(&mut out, types, name) {
        Ok(0) => ExecResult::failure(1, format!("enum: {}: not an enum type", name.unwrap_or_default())),
        Ok(_) => ExecResult::success(out),
        Err(e) => ExecResult::failure(1, format!("enum: {e}")),
    }
}
