//! Built-in tools.
//!
//! These tools are always available. Typed declaration commands are not
//! registered here; the kernel builds one per dispatch from the type table.

mod cut;
mod echo;
mod enum_decl;
mod typed;
mod unset;

pub use typed::TypedDeclare;

use super::ToolRegistry;

/// Register all built-in tools with the registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(cut::Cut);
    registry.register(echo::Echo);
    registry.register(enum_decl::Enum);
    registry.register(unset::Unset);
    registry.alias("print", "echo");
}
