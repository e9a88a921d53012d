pub mod cli;
pub mod error;
pub mod model;
pub mod processor;
pub mod writer;

pub use error::CompileError;
pub use model::{CompileOptions, RuntimeSource};

use anyhow::{Context, bail};
use clap::Parser;
use std::io::Write;

/// Compiles machine source into an XState module using default options.
///
/// `label` only shows up in error messages, usually the source path.
pub fn compile_xstate(src: &str, label: &str) -> Result<String, CompileError> {
    compile_xstate_with(src, label, &CompileOptions::default())
}

pub fn compile_xstate_with(
    src: &str,
    label: &str,
    opts: &CompileOptions,
) -> Result<String, CompileError> {
    let machine = processor::run(src).map_err(|e| CompileError::new(label, e))?;
    Ok(writer::xstate::emit(&machine, opts))
}

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let Some(input) = args.input else {
        bail!("A filename is required");
    };
    let label = input.display().to_string();

    // 1. ── Read ───────────────────────────────────────────────────────
    let src = std::fs::read_to_string(&input).with_context(|| format!("Reading {label}"))?;
    tracing::info!(input = %label, bytes = src.len(), "compiling");

    // 2. ── Compile ────────────────────────────────────────────────────
    let out = match args.emit {
        cli::Emit::Js => {
            let opts = CompileOptions {
                runtime: if args.remote {
                    RuntimeSource::Remote
                } else {
                    RuntimeSource::Package
                },
            };
            compile_xstate_with(&src, &label, &opts)?
        }
        cli::Emit::Ast => {
            let machine = processor::run(&src).map_err(|e| CompileError::new(&label, e))?;
            writer::json::emit(&machine).with_context(|| "Serializing AST")?
        }
    };

    // 3. ── Write ──────────────────────────────────────────────────────
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(out.as_bytes())
        .and_then(|()| stdout.flush())
        .with_context(|| "Writing output")?;

    Ok(())
}
