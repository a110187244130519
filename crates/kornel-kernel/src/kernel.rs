//! The Kernel: runs kornel input against a scope, a type table and tools.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                      Kernel                      │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────┐  │
//! │  │    Scope     │  │ ToolRegistry │  │   Fs   │  │
//! │  │ (variables,  │  │  (builtins)  │  │ (Local │  │
//! │  │  types, $?)  │  │              │  │ /Mem)  │  │
//! │  └──────────────┘  └──────────────┘  └────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Input is split into statements of words. A statement whose words are
//! all `NAME=value` forms is an assignment; anything else is a command,
//! resolved first as a builtin and then as a declared type name.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use kornel_types::{ExecResult, Value};

use crate::cut::DEFAULT_READ_BUFFER;
use crate::interpreter::{Assignment, Scope, VarError, Word, expand_items, expand_word, split_script};
use crate::locale::Locale;
use crate::tools::{ExecContext, Tool, ToolRegistry, ToolSchema, TypedDeclare, parse_args, register_builtins};
use crate::vfs::{Filesystem, LocalFs, MemoryFs};

/// Filesystem the kernel's tools read from.
#[derive(Debug, Clone)]
pub enum VfsMountMode {
    /// The real filesystem below `root`. Paths outside it are refused.
    Local {
        root: PathBuf,
    },
    /// An empty in-memory filesystem. Nothing touches the host.
    Memory,
}

impl Default for VfsMountMode {
    fn default() -> Self {
        VfsMountMode::Local {
            root: PathBuf::from("/"),
        }
    }
}

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this kernel (for identification).
    pub name: String,

    /// Where file operands are read from.
    pub vfs_mode: VfsMountMode,

    /// Initial working directory (VFS path).
    pub cwd: PathBuf,

    /// Character set for multibyte handling in `cut`.
    pub locale: Locale,

    /// Input chunk size for streaming tools.
    pub read_buffer: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::named("default")
    }
}

impl KernelConfig {
    /// Host filesystem, process cwd and locale from the environment.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vfs_mode: VfsMountMode::default(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            locale: Locale::from_env(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// A throwaway kernel over the host filesystem.
    pub fn transient() -> Self {
        Self::named("transient")
    }

    /// Memory only, UTF-8, rooted at `/`. Deterministic; used by tests.
    pub fn isolated() -> Self {
        Self {
            name: "isolated".to_string(),
            vfs_mode: VfsMountMode::Memory,
            cwd: PathBuf::from("/"),
            locale: Locale::Utf8,
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// Set the VFS mount mode.
    pub fn with_vfs_mode(mut self, mode: VfsMountMode) -> Self {
        self.vfs_mode = mode;
        self
    }

    /// Set the initial working directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Set the streaming chunk size. Zero is treated as one byte.
    pub fn with_read_buffer(mut self, size: usize) -> Self {
        self.read_buffer = size.max(1);
        self
    }
}

/// The Kernel: executes kornel input.
///
/// Statements run one at a time against a single scope; concurrent calls
/// to [`Kernel::execute`] are serialized on the scope lock.
pub struct Kernel {
    name: String,
    scope: RwLock<Scope>,
    tools: Arc<ToolRegistry>,
    fs: Arc<dyn Filesystem>,
    cwd: RwLock<PathBuf>,
    locale: Locale,
    read_buffer: usize,
}

impl Kernel {
    /// Create a new kernel with the given configuration.
    pub fn new(config: KernelConfig) -> Result<Self> {
        let fs: Arc<dyn Filesystem> = match &config.vfs_mode {
            VfsMountMode::Local { root } => {
                anyhow::ensure!(root.is_dir(), "vfs root {} is not a directory", root.display());
                Arc::new(LocalFs::new(root.clone()))
            }
            VfsMountMode::Memory => Arc::new(MemoryFs::new()),
        };

        let mut tools = ToolRegistry::new();
        register_builtins(&mut tools);
        debug!(name = %config.name, locale = ?config.locale, "kernel created");

        Ok(Self {
            name: config.name,
            scope: RwLock::new(Scope::new()),
            tools: Arc::new(tools),
            fs,
            cwd: RwLock::new(config.cwd),
            locale: config.locale,
            read_buffer: config.read_buffer.max(1),
        })
    }

    /// Create a transient kernel over the host filesystem.
    pub fn transient() -> Result<Self> {
        Self::new(KernelConfig::transient())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute kornel source.
    ///
    /// Returns the accumulated output of every statement, with the exit
    /// code of the last one that ran.
    pub async fn execute(&self, input: &str) -> Result<ExecResult> {
        self.execute_with_stdin(input, None).await
    }

    /// Execute kornel source, offering `stdin` to the first command that
    /// reads standard input.
    #[tracing::instrument(level = "info", skip(self, input, stdin), fields(input_len = input.len()))]
    pub async fn execute_with_stdin(&self, input: &str, stdin: Option<Vec<u8>>) -> Result<ExecResult> {
        let statements = split_script(input).context("syntax error")?;
        let mut scope = self.scope.write().await;
        let mut stdin = stdin;
        let mut result = ExecResult::success("");

        for words in &statements {
            let (outcome, stop) = self.execute_statement(words, &mut scope, &mut stdin).await;
            scope.set_last_result(outcome.clone());
            result.append(outcome);
            if stop {
                warn!(code = result.code, "script aborted");
                break;
            }
        }

        Ok(result)
    }

    /// Run one builtin (or type declaration command) with pre-split words.
    pub async fn run_command(&self, name: &str, words: &[String], stdin: Option<Vec<u8>>) -> ExecResult {
        let mut scope = self.scope.write().await;
        let mut stdin = stdin;
        let Some(tool) = self.resolve_tool(name, &scope) else {
            return ExecResult::failure(127, format!("kornel: {name}: not found\n"));
        };
        let (result, _) = self.dispatch(tool, words, &mut scope, &mut stdin).await;
        scope.set_last_result(result.clone());
        result
    }

    /// Returns the statement's result and whether the script must stop.
    async fn execute_statement(
        &self,
        words: &[Word],
        scope: &mut Scope,
        stdin: &mut Option<Vec<u8>>,
    ) -> (ExecResult, bool) {
        if words.iter().all(|w| w.assignment_name().is_some()) {
            for word in words {
                if let Err(e) = assign_word(word, scope) {
                    return failure_of(&e);
                }
            }
            return (ExecResult::success(""), false);
        }

        let name = match expand_word(&words[0], scope) {
            Ok(name) => name,
            Err(e) => return failure_of(&e),
        };
        let Some(tool) = self.resolve_tool(&name, scope) else {
            return (ExecResult::failure(127, format!("kornel: {name}: not found\n")), false);
        };

        let declaration = name == "enum" || scope.types().contains(&name);
        let mut argv = Vec::with_capacity(words.len() - 1);
        for word in &words[1..] {
            let expanded = match (declaration, word.array_items(), word.assignment_name()) {
                (true, Some(items), Some(var)) => {
                    expand_items(items, scope).and_then(|items| {
                        scope.assign_array(var, &items)?;
                        Ok(var.to_string())
                    })
                }
                _ => expand_word(word, scope),
            };
            match expanded {
                Ok(text) => argv.push(text),
                Err(e) => return failure_of(&e),
            }
        }

        self.dispatch(tool, &argv, scope, stdin).await
    }

    fn resolve_tool(&self, name: &str, scope: &Scope) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).or_else(|| {
            scope
                .types()
                .contains(name)
                .then(|| Arc::new(TypedDeclare::new(name)) as Arc<dyn Tool>)
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(tool = tool.name()))]
    async fn dispatch(
        &self,
        tool: Arc<dyn Tool>,
        argv: &[String],
        scope: &mut Scope,
        stdin: &mut Option<Vec<u8>>,
    ) -> (ExecResult, bool) {
        let schema = tool.schema();
        let args = match parse_args(argv, &schema) {
            Ok(args) => args,
            Err(e) => {
                let message = format!("{}: {e}\nusage: {}\n", tool.name(), schema.usage());
                return (ExecResult::failure(2, message), false);
            }
        };

        let mut ctx = ExecContext::with_scope(self.fs.clone(), std::mem::take(scope));
        ctx.cwd = self.cwd.read().await.clone();
        ctx.stdin = stdin.take();
        ctx.locale = self.locale;
        ctx.read_buffer = self.read_buffer;

        let mut result = tool.execute(args, &mut ctx).await;

        *scope = ctx.scope;
        *stdin = ctx.stdin;
        if !result.err.is_empty() && !result.err.ends_with('\n') {
            result.err.push('\n');
        }
        debug!(code = result.code, "tool finished");
        (result, ctx.abort)
    }

    // --- Variable Access ---

    /// String value of a variable, read through its discipline.
    pub async fn get_var(&self, name: &str) -> Option<String> {
        self.scope.read().await.get_string(name)
    }

    /// Set a plain variable.
    pub async fn set_var(&self, name: &str, value: Value) {
        self.scope.write().await.set(name, value);
    }

    /// Get the last result ($?).
    pub async fn last_result(&self) -> ExecResult {
        self.scope.read().await.last_result().clone()
    }

    /// Get current working directory.
    pub async fn cwd(&self) -> PathBuf {
        self.cwd.read().await.clone()
    }

    /// Set current working directory.
    pub async fn set_cwd(&self, path: PathBuf) {
        *self.cwd.write().await = path;
    }

    /// Get available tool schemas.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.schemas()
    }

    /// The filesystem tools read from.
    pub fn fs(&self) -> Arc<dyn Filesystem> {
        self.fs.clone()
    }

    /// Drop every variable and declared type.
    pub async fn reset(&self) {
        *self.scope.write().await = Scope::new();
    }
}

/// `NAME=value`, `NAME[SUB]=value` or `NAME=(...)`.
fn assign_word(word: &Word, scope: &mut Scope) -> Result<()> {
    if let (Some(items), Some(name)) = (word.array_items(), word.assignment_name()) {
        let items = expand_items(items, scope)?;
        scope.assign_array(name, &items)?;
        return Ok(());
    }
    let text = expand_word(word, scope)?;
    let (lhs, value) = text
        .split_once('=')
        .with_context(|| format!("{text}: not an assignment"))?;
    match lhs.strip_suffix(']').and_then(|l| l.split_once('[')) {
        Some((name, subscript)) => scope.assign_element(name, subscript, Assignment::Text(value))?,
        None => scope.assign(lhs, Assignment::Text(value))?,
    }
    Ok(())
}

/// Non-zero result for an error raised outside a tool.
fn failure_of(e: &anyhow::Error) -> (ExecResult, bool) {
    let fatal = e.downcast_ref::<VarError>().is_some_and(VarError::is_fatal);
    (ExecResult::failure(1, format!("kornel: {e:#}\n")), fatal)
}
