//! Execution context for tools.

use std::path::PathBuf;
use std::sync::Arc;

use crate::interpreter::Scope;
use crate::locale::Locale;
use crate::vfs::Filesystem;

/// Execution context passed to tools.
///
/// Owns the variable scope for the duration of a command; the kernel
/// moves its scope in and takes it back afterwards.
pub struct ExecContext {
    /// Filesystem that file operands are read from.
    pub fs: Arc<dyn Filesystem>,
    /// Variable scope.
    pub scope: Scope,
    /// Current working directory (VFS path).
    pub cwd: PathBuf,
    /// Standard input for the tool.
    pub stdin: Option<Vec<u8>>,
    /// Character set used to decode input.
    pub locale: Locale,
    /// Chunk size for streaming tools.
    pub read_buffer: usize,
    /// Set by a tool to stop the rest of the script.
    pub abort: bool,
}

impl ExecContext {
    /// Create a context over `fs` with an empty scope.
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self::with_scope(fs, Scope::new())
    }

    /// Create a context with a specific scope.
    pub fn with_scope(fs: Arc<dyn Filesystem>, scope: Scope) -> Self {
        Self {
            fs,
            scope,
            cwd: PathBuf::from("/"),
            stdin: None,
            locale: Locale::default(),
            read_buffer: crate::cut::DEFAULT_READ_BUFFER,
            abort: false,
        }
    }

    /// Set stdin for this context.
    pub fn set_stdin(&mut self, stdin: impl Into<Vec<u8>>) {
        self.stdin = Some(stdin.into());
    }

    /// Take stdin, leaving none behind.
    pub fn take_stdin(&mut self) -> Vec<u8> {
        self.stdin.take().unwrap_or_default()
    }

    /// Resolve a path relative to cwd.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if path.starts_with('/') {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryFs;

    #[test]
    fn resolve_relative_and_absolute() {
        let mut ctx = ExecContext::new(Arc::new(MemoryFs::new()));
        ctx.cwd = PathBuf::from("/data");
        assert_eq!(ctx.resolve_path("a.txt"), PathBuf::from("/data/a.txt"));
        assert_eq!(ctx.resolve_path("/b.txt"), PathBuf::from("/b.txt"));
    }

    #[test]
    fn stdin_is_taken_once() {
        let mut ctx = ExecContext::new(Arc::new(MemoryFs::new()));
        ctx.set_stdin(b"x\n".to_vec());
        assert_eq!(ctx.take_stdin(), b"x\n");
        assert!(ctx.take_stdin().is_empty());
    }
}
