//! Field and column extraction engine behind the `cut` builtin.
//!
//! A [`Cutter`] compiles a selector list once and then streams any number
//! of inputs through the byte/character extractor or the field extractor.
//!
//! ```
//! use kornel_kernel::cut::{CutMode, CutOptions, Cutter};
//!
//! let mut cutter = Cutter::new("2-3", CutOptions::new(CutMode::Fields).with_word_delim(b':')).unwrap();
//! let mut out = Vec::new();
//! cutter.cut(&b"a:b:c:d\n"[..], &mut out).unwrap();
//! assert_eq!(out, b"b:c\n");
//! ```

mod columns;
pub mod delim;
mod fields;
pub mod mbchar;
pub mod selector;

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::debug;

use crate::locale::Locale;

pub use delim::{ByteClass, ClassTable, Delimiter};
pub use selector::{INFINITE, Selector};

/// Default input chunk for the field extractor.
pub const DEFAULT_READ_BUFFER: usize = 64 * 1024;

/// Errors from compiling a cut invocation.
#[derive(Debug, Error)]
pub enum CutError {
    #[error("bad list for b/c/f option: {0}")]
    BadList(String),

    #[error("invalid decreasing range: {0}")]
    InvalidRange(String),

    #[error("list is empty")]
    EmptyList,

    #[error("delimiter must be a single character: {0:?}")]
    Delimiter(String),

    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl CutError {
    /// Exit status for the `cut` builtin.
    pub fn exit_code(&self) -> i64 {
        match self {
            Self::Usage(_) | Self::EmptyList => 2,
            _ => 1,
        }
    }
}

/// What a selector list counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutMode {
    /// `-b`
    Bytes,
    /// `-c`
    Chars,
    /// `-f`
    Fields,
}

/// Options for one cut invocation.
#[derive(Debug, Clone)]
pub struct CutOptions {
    pub mode: CutMode,
    /// `-d`, fields mode only.
    pub word_delim: Delimiter,
    /// `-D`, record terminator on input and output.
    pub line_delim: Delimiter,
    /// `-s`: drop records without a word delimiter.
    pub suppress: bool,
    /// `-n`: never split a multibyte character in byte mode.
    pub nosplit: bool,
    /// `-N`: no record terminator after byte/character output.
    pub no_newline: bool,
    /// `-R`: fixed record length, 0 for delimited records.
    pub reclen: usize,
    pub locale: Locale,
    pub read_buffer: usize,
}

impl CutOptions {
    pub fn new(mode: CutMode) -> Self {
        Self {
            mode,
            word_delim: Delimiter::tab(),
            line_delim: Delimiter::newline(),
            suppress: false,
            nosplit: false,
            no_newline: false,
            reclen: 0,
            locale: Locale::default(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    pub fn with_word_delim(mut self, b: u8) -> Self {
        self.word_delim = Delimiter::byte(b);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_read_buffer(mut self, size: usize) -> Self {
        self.read_buffer = size;
        self
    }
}

/// A compiled cut invocation.
#[derive(Debug)]
pub struct Cutter {
    selector: Selector,
    options: CutOptions,
    classes: ClassTable,
    /// Spill area for records not yet known to be delimited.
    scratch: Option<Vec<u8>>,
}

impl Cutter {
    /// Compile `list` for `options`.
    pub fn new(list: &str, options: CutOptions) -> Result<Self, CutError> {
        if options.suppress && options.mode != CutMode::Fields {
            return Err(CutError::Usage(
                "suppressing non-delimited lines makes sense only when operating on fields".into(),
            ));
        }
        let selector = Selector::parse(list)?;
        let classes = ClassTable::new(&options.word_delim, &options.line_delim, options.locale);
        debug!(mode = ?options.mode, gaps = ?selector.gaps(), "compiled cut selector");
        Ok(Self {
            selector,
            options,
            classes,
            scratch: None,
        })
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn options(&self) -> &CutOptions {
        &self.options
    }

    /// Stream one input through the extractor.
    pub fn cut<R: Read, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        match self.options.mode {
            CutMode::Bytes | CutMode::Chars => columns::cut_columns(self, input, out),
            CutMode::Fields => {
                let mut scratch = self.scratch.take();
                let result = fields::cut_fields(self, &mut scratch, input, out);
                self.scratch = scratch;
                result
            }
        }
    }
}
