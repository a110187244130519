//! cut: Select bytes, characters or fields from each record.

use std::io;

use async_trait::async_trait;
use tracing::{debug, trace};

use kornel_types::{ExecResult, Value};

use crate::cut::{CutMode, CutOptions, Cutter, Delimiter};
use crate::tools::argv::int_option;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Cut tool: streams each operand through a compiled [`Cutter`].
pub struct Cut;

#[async_trait]
impl Tool for Cut {
    fn name(&self) -> &str {
        "cut"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("cut", "Select bytes, characters or fields from each record")
            .param(ParamSchema::optional("path", "string", Value::Null, "Files to read (stdin if none, or -)"))
            .param(
                ParamSchema::optional("bytes", "string", Value::Null, "Select byte positions")
                    .with_aliases(["-b", "--bytes"]),
            )
            .param(
                ParamSchema::optional("characters", "string", Value::Null, "Select character positions")
                    .with_aliases(["-c", "--characters"]),
            )
            .param(
                ParamSchema::optional("fields", "string", Value::Null, "Select fields")
                    .with_aliases(["-f", "--fields"]),
            )
            .param(
                ParamSchema::optional("delimiter", "string", Value::String("\t".into()), "Field delimiter")
                    .with_aliases(["-d", "--delimiter"]),
            )
            .param(
                ParamSchema::optional("line_delimiter", "string", Value::String("\n".into()), "Record delimiter")
                    .with_aliases(["-D", "--line-delimiter"]),
            )
            .param(
                ParamSchema::optional("nosplit", "bool", Value::Bool(false), "Do not split multibyte characters with -b")
                    .with_aliases(["-n", "--nosplit"]),
            )
            .param(
                ParamSchema::optional("nonewline", "bool", Value::Bool(false), "No record terminator after -b/-c output")
                    .with_aliases(["-N", "--nonewline"]),
            )
            .param(
                ParamSchema::optional("reclen", "int", Value::Int(0), "Fixed record length for -b/-c")
                    .with_aliases(["-R", "-r", "--reclen"]),
            )
            .param(
                ParamSchema::optional("suppress", "bool", Value::Bool(false), "Drop records without a field delimiter")
                    .with_aliases(["-s", "--suppress", "--only-delimited"]),
            )
            .example("Second and third colon separated fields", "cut -d: -f2-3 /etc/passwd")
            .example("Characters 4 and 5", "cut -c4-5 names.txt")
            .example("Fixed 80 byte records", "cut -b1-10 -R80 -N data.bin")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let mut cutter = match build_cutter(&args, ctx) {
            Ok(cutter) => cutter,
            Err((code, message)) => return ExecResult::failure(code, format!("cut: {message}")),
        };

        let mut operands = args.positional_strings();
        if operands.is_empty() {
            operands.push("-".to_string());
        }
        debug!(mode = ?cutter.options().mode, files = operands.len(), "cut");

        let mut out = Vec::new();
        let mut err = String::new();
        let mut code = 0;
        for path in &operands {
            let result = if path == "-" {
                let stdin = ctx.take_stdin();
                cutter.cut(&stdin[..], &mut out)
            } else {
                let resolved = ctx.resolve_path(path);
                match ctx.fs.stat(&resolved).await {
                    Ok(meta) if meta.is_dir => Err(io::Error::new(io::ErrorKind::IsADirectory, "is a directory")),
                    Ok(meta) => {
                        trace!(path = %resolved.display(), size = meta.size, "cut operand");
                        match ctx.fs.open(&resolved).await {
                            Ok(reader) => cutter.cut(reader, &mut out),
                            Err(e) => Err(e),
                        }
                    }
                    Err(e) => Err(e),
                }
            };
            if let Err(e) = result {
                err.push_str(&format!("cut: {path}: {e}\n"));
                code = 1;
            }
        }

        ExecResult::from_bytes(code, out, err)
    }
}

fn build_cutter(args: &ToolArgs, ctx: &ExecContext) -> Result<Cutter, (i64, String)> {
    let lists: Vec<(CutMode, String)> = [
        (CutMode::Bytes, "bytes"),
        (CutMode::Chars, "characters"),
        (CutMode::Fields, "fields"),
    ]
    .into_iter()
    .filter_map(|(mode, name)| args.get_string(name, usize::MAX).map(|list| (mode, list)))
    .collect();

    let (mode, list) = match lists.as_slice() {
        [(mode, list)] => (*mode, list.clone()),
        [] => return Err((2, "you must specify a list of bytes, characters, or fields".into())),
        _ => return Err((2, "only one type of list may be specified".into())),
    };

    let mut options = CutOptions::new(mode).with_locale(ctx.locale).with_read_buffer(ctx.read_buffer);
    if let Some(text) = args.get_string("delimiter", usize::MAX) {
        options.word_delim = Delimiter::parse(&text, ctx.locale).map_err(|e| (e.exit_code(), e.to_string()))?;
    }
    if let Some(text) = args.get_string("line_delimiter", usize::MAX) {
        options.line_delim = Delimiter::parse(&text, ctx.locale).map_err(|e| (e.exit_code(), e.to_string()))?;
    }
    options.suppress = args.has_flag("suppress");
    options.nosplit = args.has_flag("nosplit");
    options.no_newline = args.has_flag("nonewline");
    let reclen = int_option(args, "reclen").map_err(|e| (2, e.to_string()))?;
    if let Some(n) = reclen.filter(|n| *n > 0) {
        options.reclen = n as usize;
    }

    Cutter::new(&list, options).map_err(|e| (e.exit_code(), e.to_string()))
}
