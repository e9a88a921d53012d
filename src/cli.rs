use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input machine source file
    pub input: Option<PathBuf>,
    /// Import the runtime from the skypack CDN instead of the `xstate` package
    #[arg(long)]
    pub remote: bool,
    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Js)]
    pub emit: Emit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// XState module
    Js,
    /// Validated AST as JSON
    Ast,
}
