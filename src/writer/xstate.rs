//! Emit the XState module for a validated machine.
//!
//! ```text
//! import { Machine } from 'xstate';
//!
//! export const light = Machine({
//!   initial: 'green',
//!   states: { … }
//! });
//! ```

use std::fmt::{self, Write};

use super::config::{JsValue, MachineConfig};
use crate::model::CompileOptions;
use crate::processor::validator::ValidatedMachine;

const INDENT: &str = "  ";

/// Generated module text, trailing newline included.
pub fn emit(machine: &ValidatedMachine, opts: &CompileOptions) -> String {
    let module = Module {
        binding: machine.name(),
        runtime: opts.runtime.specifier(),
        config: MachineConfig::from_machine(machine).to_js(),
    };
    let js = module.to_string();
    tracing::debug!(bytes = js.len(), runtime = module.runtime, "emitted module");
    js
}

struct Module<'a> {
    binding: Option<&'a str>,
    runtime: &'a str,
    config: JsValue,
}

impl fmt::Display for Module<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "import {{ Machine }} from {};", quote(self.runtime))?;
        writeln!(f)?;
        match self.binding {
            Some(name) => write!(f, "export const {name} = ")?,
            None => write!(f, "export default ")?,
        }
        write!(f, "Machine(")?;
        write_value(f, &self.config, 0)?;
        writeln!(f, ");")
    }
}

fn write_value<W: Write>(out: &mut W, value: &JsValue, depth: usize) -> fmt::Result {
    match value {
        JsValue::Str(s) => out.write_str(&quote(s)),
        JsValue::Object(props) if props.is_empty() => {
            write!(out, "{{\n\n{}}}", INDENT.repeat(depth))
        }
        JsValue::Object(props) => {
            out.write_str("{\n")?;
            for (i, (key, val)) in props.iter().enumerate() {
                if i > 0 {
                    out.write_str(",\n")?;
                }
                write!(out, "{}{}: ", INDENT.repeat(depth + 1), property_key(key))?;
                write_value(out, val, depth + 1)?;
            }
            write!(out, "\n{}}}", INDENT.repeat(depth))
        }
    }
}

/// Single-quoted JS string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Bare identifier when JS allows it, quoted otherwise.
fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if bare { key.to_string() } else { quote(key) }
}
