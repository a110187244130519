//! unset: Remove variables from scope.

use async_trait::async_trait;

use kornel_types::ExecResult;

use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Unset tool: removes variables, detaching their disciplines.
pub struct Unset;

#[async_trait]
impl Tool for Unset {
    fn name(&self) -> &str {
        "unset"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("unset", "Remove variables from scope")
            .param(ParamSchema::required("names", "array", "Variable names to unset"))
            .example("Remove a variable", "unset MY_VAR")
            .example("Remove multiple", "unset A B C")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let names = args.positional_strings();
        if names.is_empty() {
            return ExecResult::failure(2, "unset: missing variable name");
        }

        let mut err = String::new();
        for name in &names {
            if let Err(e) = ctx.scope.unset(name) {
                err.push_str(&format!("unset: {e}\n"));
            }
        }
        let code = if err.is_empty() { 0 } else { 1 };
        ExecResult::from_output(code, "", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::VarAttrs;
    use crate::types::EnumDescriptor;
    use crate::vfs::MemoryFs;
    use kornel_types::Value;
    use std::sync::Arc;

    fn make_ctx() -> ExecContext {
        ExecContext::new(Arc::new(MemoryFs::new()))
    }

    fn names(items: &[&str]) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.positional = items.iter().map(|s| Value::String(s.to_string())).collect();
        args
    }

    #[tokio::test]
    async fn removes_plain_and_typed() {
        let mut ctx = make_ctx();
        ctx.scope.set("X", Value::Int(1));
        let descriptor = EnumDescriptor::new("T", vec!["a".into(), "b".into()], false).unwrap();
        let entry = ctx.scope.types_mut().register(descriptor).clone();
        let typed = entry.discipline().instance("t", Some("b")).unwrap();
        ctx.scope.declare(typed);

        let result = Unset.execute(names(&["X", "t", "missing"]), &mut ctx).await;
        assert!(result.ok());
        assert!(!ctx.scope.contains("X"));
        assert!(!ctx.scope.contains("t"));
    }

    #[tokio::test]
    async fn readonly_is_refused() {
        let mut ctx = make_ctx();
        ctx.scope.set("R", Value::Int(1));
        ctx.scope.get_mut("R").unwrap().add_attrs(VarAttrs::READONLY);
        let result = Unset.execute(names(&["R"]), &mut ctx).await;
        assert_eq!(result.code, 1);
        assert_eq!(result.err, "unset: R: is read only\n");
        assert!(ctx.scope.contains("R"));
    }

    #[tokio::test]
    async fn requires_a_name() {
        let mut ctx = make_ctx();
        assert_eq!(Unset.execute(ToolArgs::new(), &mut ctx).await.code, 2);
    }
}
