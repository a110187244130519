//! kornel CLI entry point.
//!
//! Usage:
//!   kornel -c <commands>       # Execute commands and exit
//!   kornel script.kn           # Run a script
//!   kornel <builtin> [ARGS]    # Run one builtin, e.g. `kornel cut -d: -f1`

use std::env;
use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kornel_kernel::{Kernel, KernelConfig};

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries data only
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("kornel: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None | Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("kornel {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            run_source(cmd)
        }

        Some(name) if !name.starts_with('-') && !name.contains('/') && !name.contains('.') => {
            run_builtin(name, &args[2..])
        }

        Some(path) if !path.starts_with('-') => {
            let source = std::fs::read_to_string(path).with_context(|| format!("failed to read script: {path}"))?;
            // Skip shebang if present
            let source = match source.strip_prefix("#!") {
                Some(rest) => rest.split_once('\n').map(|(_, body)| body.to_string()).unwrap_or_default(),
                None => source,
            };
            run_source(&source)
        }

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'kornel --help' for usage.");
            Ok(ExitCode::from(2))
        }
    }
}

fn print_help() {
    println!(
        r#"kornel v{}

Usage:
  kornel -c <commands>         Execute commands and exit
  kornel <script>              Run a script file
  kornel <builtin> [ARGS...]   Run one builtin (cut, enum, echo, print, unset)

Options:
  -c <commands>                Execute command string and exit
  -h, --help                   Show this help
  -V, --version                Show version

Environment:
  RUST_LOG                     Log filter, e.g. kornel_kernel=debug
  LC_ALL, LC_CTYPE, LANG       Character set for cut (UTF-8 or single byte)

Examples:
  kornel cut -d: -f1,3 /etc/passwd
  kornel -c 'enum Color=(red green blue); Color c=green; echo $((c))'
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Piped stdin, or nothing when attached to a terminal.
fn read_stdin() -> Result<Option<Vec<u8>>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut bytes = Vec::new();
    stdin.read_to_end(&mut bytes).context("failed to read stdin")?;
    Ok(Some(bytes))
}

fn make_kernel() -> Result<Kernel> {
    Kernel::new(KernelConfig::named("cli")).context("failed to create kernel")
}

fn run_source(source: &str) -> Result<ExitCode> {
    let kernel = make_kernel()?;
    let stdin = read_stdin()?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(kernel.execute_with_stdin(source, stdin))?;
    finish(result.stdout_bytes(), &result.err, result.code)
}

fn run_builtin(name: &str, words: &[String]) -> Result<ExitCode> {
    let kernel = make_kernel()?;
    let stdin = read_stdin()?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(kernel.run_command(name, words, stdin));
    finish(result.stdout_bytes(), &result.err, result.code)
}

fn finish(out: &[u8], err: &str, code: i64) -> Result<ExitCode> {
    eprint!("{err}");
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(out).and_then(|()| stdout.flush()) {
        eprintln!("kornel: write error: {e}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
