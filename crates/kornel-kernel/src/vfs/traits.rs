//! Core VFS traits and types.

use async_trait::async_trait;
use std::io::{self, Read};
use std::path::Path;

/// Metadata about a file or directory.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub is_dir: bool,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

/// Abstract filesystem interface.
///
/// All operations use paths relative to the filesystem root.
/// For example, if a `LocalFs` is rooted at `/home/amy/project`,
/// then `open("data.csv")` opens `/home/amy/project/data.csv`.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Open a file for streaming reads.
    async fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Write data to a file, creating it if it doesn't exist.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Get metadata for a file or directory.
    async fn stat(&self, path: &Path) -> io::Result<Metadata>;
}
