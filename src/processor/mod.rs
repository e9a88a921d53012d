//! The functional core: source text in, validated machine out.
pub mod ast;
pub mod lexer;
pub mod machine_parser;
pub mod validator;

use crate::error::Result;
use validator::ValidatedMachine;

/// Runs every front-end pass and returns a tree the writers can trust.
pub fn run(src: &str) -> Result<ValidatedMachine> {
    let ast = machine_parser::parse(src)?;
    validator::validate(ast)
}
