//! Core tool trait.

use async_trait::async_trait;

use kornel_types::ExecResult;
pub use kornel_types::{ParamSchema, ToolArgs, ToolSchema};

use super::context::ExecContext;

/// A command the kernel can run.
///
/// Builtins and typed declaration commands share this interface; the
/// kernel builds [`ToolArgs`] from the schema before calling `execute`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name used to invoke this tool.
    fn name(&self) -> &str;

    /// The tool's parameter schema.
    fn schema(&self) -> ToolSchema;

    /// Run the tool.
    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult;
}
