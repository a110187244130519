//! echo: Print arguments to stdout.

use async_trait::async_trait;

use kornel_types::{ExecResult, Value};

use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Echo tool: prints arguments to stdout. Also registered as `print`.
pub struct Echo;

#[async_trait]
impl Tool for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("echo", "Print arguments to standard output")
            .param(ParamSchema::optional("args", "any", Value::Null, "Values to print"))
            .param(
                ParamSchema::optional("no_newline", "bool", Value::Bool(false), "Do not output trailing newline")
                    .with_aliases(["-n"]),
            )
    }

    async fn execute(&self, args: ToolArgs, _ctx: &mut ExecContext) -> ExecResult {
        let mut output = args.positional_strings().join(" ");
        if !args.has_flag("no_newline") {
            output.push('\n');
        }
        ExecResult::success(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFs;
    use std::sync::Arc;

    fn make_ctx() -> ExecContext {
        ExecContext::new(Arc::new(MemoryFs::new()))
    }

    #[tokio::test]
    async fn test_echo_joins_with_spaces() {
        let mut ctx = make_ctx();
        let mut args = ToolArgs::new();
        args.positional.push(Value::String("1".into()));
        args.positional.push(Value::String("2".into()));
        let result = Echo.execute(args, &mut ctx).await;
        assert!(result.ok());
        assert_eq!(result.out, "1 2\n");
    }

    #[tokio::test]
    async fn test_echo_no_newline() {
        let mut ctx = make_ctx();
        let mut args = ToolArgs::new();
        args.positional.push(Value::String("x".into()));
        args.flags.insert("no_newline".into());
        let result = Echo.execute(args, &mut ctx).await;
        assert_eq!(result.out, "x");
    }

    #[tokio::test]
    async fn test_echo_empty_prints_newline() {
        let mut ctx = make_ctx();
        let result = Echo.execute(ToolArgs::new(), &mut ctx).await;
        assert_eq!(result.out, "\n");
    }
}
