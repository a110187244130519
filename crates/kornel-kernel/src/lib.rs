//! kornel-kernel: enumeration types for shell variables and a streaming
//! `cut` engine, behind a small shell kernel.
//!
//! This crate provides:
//!
//! - **Types**: enum descriptors, the enum discipline, the type table and `enum -p`
//! - **Cut**: selector lists compiled to gap lists, column and field extractors
//! - **Interpreter**: variables with disciplines, scopes, word splitting and expansion
//! - **Arithmetic**: `$(( ))` evaluation with enum constants
//! - **VFS**: in-memory and local filesystems
//! - **Tools**: tool trait, option parsing and builtin commands
//! - **Kernel**: statement execution and configuration

pub mod arithmetic;
pub mod cut;
pub mod interpreter;
pub mod kernel;
pub mod locale;
pub mod tools;
pub mod types;
pub mod vfs;

pub use kernel::{Kernel, KernelConfig, VfsMountMode};
pub use locale::Locale;
