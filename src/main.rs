//! `c0c` — the C0 compiler CLI (`spec.md` §6).
//!
//! Grounded in `y-lang`'s `bin/why.rs`/`bin/why/cli.rs`: a clap derive `Cli`,
//! a verbosity flag driving `simple_logger`, and a `read_to_string`-then-
//! compile pipeline.
use std::fmt::Display;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use log::{error, info};

use c0c::emit::{binary, text};
use c0c::{analyse, tokenize};

#[derive(Parser)]
#[command(name = "c0c", about = "Compiler for C0, a strict subset of C")]
#[command(group(ArgGroup::new("format").required(true).args(["compile", "assembly"])))]
struct Cli {
    /// Source file to compile, or `-` to read from stdin.
    input: PathBuf,

    /// Output path, or `-` to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Emit a bit-exact binary object file.
    #[arg(short = 'c')]
    compile: bool,

    /// Emit textual assembly.
    #[arg(short = 's', long = "assembly")]
    assembly: bool,

    /// Raise the log level from warn to info.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn fail(msg: impl Display) -> ExitCode {
    error!("{msg}");
    ExitCode::from(2)
}

fn read_input(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> io::Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(bytes)
    } else {
        fs::write(path, bytes)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    simple_logger::init_with_level(if cli.verbose {
        log::Level::Info
    } else {
        log::Level::Warn
    })
    .expect("logger can only be initialised once");

    let source = match read_input(&cli.input) {
        Ok(source) => source,
        Err(err) => return fail(format!("reading {}: {err}", cli.input.display())),
    };

    info!("tokenizing {}", cli.input.display());
    let tokens = match tokenize(&source) {
        Ok(tokens) => tokens,
        Err(err) => return fail(err),
    };

    info!("analysing");
    let program = match analyse(tokens) {
        Ok(program) => program,
        Err(err) => return fail(err),
    };

    info!("emitting to {}", cli.output.display());
    let bytes = if cli.compile {
        binary::emit(&program)
    } else {
        text::emit(&program).into_bytes()
    };

    match write_output(&cli.output, &bytes) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(format!("writing {}: {err}", cli.output.display())),
    }
}
