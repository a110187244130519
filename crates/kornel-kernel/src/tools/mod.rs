//! Tool system for kornel.
//!
//! Every command is a tool implementing the [`Tool`] trait. The kernel
//! parses each command's words against the tool's schema and hands the
//! resulting [`ToolArgs`] to `execute`.
//!
//! ```text
//! ToolRegistry
//! ├── Builtins (cut, enum, echo/print, unset)
//! └── Typed declarations (one per enum type, dispatched by type name)
//! ```

pub mod argv;
mod builtin;
mod context;
mod registry;
mod traits;

pub use argv::{ArgError, parse_args};
pub use builtin::{TypedDeclare, register_builtins};
pub use context::ExecContext;
pub use registry::ToolRegistry;
pub use traits::{ParamSchema, Tool, ToolArgs, ToolSchema};
