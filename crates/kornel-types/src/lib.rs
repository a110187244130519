//! Pure data types for kornel: values, command results, tool schemas.
//!
//! This crate is a leaf dependency with no async runtime, no I/O and no
//! knowledge of the cut engine or enum types. It exists so that embedders can
//! build `ToolArgs` and inspect `ExecResult`s without pulling in the kernel.

pub mod result;
pub mod tool;
pub mod value;

// Flat re-exports for convenience
pub use result::*;
pub use tool::*;
pub use value::*;
