//! Virtual filesystem for the kernel.
//!
//! - **MemoryFs**: In-memory ephemeral storage (tests, sandboxed kernels)
//! - **LocalFs**: Real filesystem access under a root directory
//!
//! Tools only see the [`Filesystem`] trait; the kernel picks the backend
//! from its [`VfsMountMode`](crate::kernel::VfsMountMode).

mod local;
mod memory;
mod traits;

pub use local::LocalFs;
pub use memory::MemoryFs;
pub use traits::{Filesystem, Metadata};
