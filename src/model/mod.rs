use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a token in the source, both fields 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const START: Pos = Pos { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Where the generated module imports the runtime from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSource {
    /// The `xstate` package, resolved by the consumer's bundler.
    #[default]
    Package,
    /// The skypack CDN build, for use straight from a browser.
    Remote,
}

impl RuntimeSource {
    pub fn specifier(self) -> &'static str {
        match self {
            RuntimeSource::Package => "xstate",
            RuntimeSource::Remote => "https://cdn.skypack.dev/xstate",
        }
    }
}

/// Knobs that change the emitted text. Everything else is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub runtime: RuntimeSource,
}
