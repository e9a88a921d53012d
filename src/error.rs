//! Compiler error types.
//!
//! Every stage fails with an [`Error`]: the position of the offending token
//! plus an [`ErrorKind`]. The façade attaches the source label and hands the
//! caller a [`CompileError`].

use thiserror::Error;

use crate::model::Pos;

pub type Result<T> = std::result::Result<T, Error>;

/// Characters the lexer cannot turn into a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string label")]
    UnterminatedString,
}

/// Token sequences the grammar does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found '{found}'")]
    Unexpected { found: String, expected: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },

    #[error("state '{state}' declares more than one '{block}' block")]
    DuplicateBlock { state: String, block: &'static str },
}

/// Well-formedness rules a parsed machine can still break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate state '{name}'")]
    DuplicateState { name: String },

    #[error("machine declares no states")]
    EmptyMachine,

    #[error("{scope} declares more than one initial state ('{name}')")]
    DuplicateInitial { scope: String, name: String },

    #[error("{scope} has child states but no initial state")]
    MissingInitial { scope: String },

    #[error("initial state '{name}' is not declared in {scope}")]
    UnresolvedInitial { scope: String, name: String },

    #[error("state '{state}' handles event '{event}' more than once")]
    DuplicateEvent { state: String, event: String },

    #[error("transition '{event}' in state '{state}' targets unknown state '{target}'")]
    UnresolvedTarget {
        state: String,
        event: String,
        target: String,
    },

    #[error("final state '{name}' cannot have child states")]
    FinalWithChildren { name: String },

    #[error("final state '{name}' cannot have transitions")]
    FinalWithTransitions { name: String },

    #[error("'{name}' cannot be used as the exported machine name")]
    InvalidBinding { name: String },

    #[error("'{name}' cannot be used as a state or event name")]
    ReservedKey { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// A stage failure, positioned but not yet labeled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pos}: {kind}")]
pub struct Error {
    pub pos: Pos,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(pos: Pos, kind: impl Into<ErrorKind>) -> Self {
        Self {
            pos,
            kind: kind.into(),
        }
    }
}

/// The single error `compile_xstate` reports: label, line, column, message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label}:{}:{}: {}", .error.pos.line, .error.pos.column, .error.kind)]
pub struct CompileError {
    pub label: String,
    pub error: Error,
}

impl CompileError {
    pub fn new(label: impl Into<String>, error: Error) -> Self {
        Self {
            label: label.into(),
            error,
        }
    }

    pub fn pos(&self) -> Pos {
        self.error.pos
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error.kind
    }

    /// Short stable code, handy for tests and tooling that match on errors.
    pub fn error_code(&self) -> &'static str {
        match &self.error.kind {
            ErrorKind::Lex(_) => "LEX",
            ErrorKind::Parse(_) => "PARSE",
            ErrorKind::Validation(e) => match e {
                ValidationError::DuplicateState { .. } => "DUPLICATE_STATE",
                ValidationError::EmptyMachine => "EMPTY_MACHINE",
                ValidationError::DuplicateInitial { .. } => "DUPLICATE_INITIAL",
                ValidationError::MissingInitial { .. } => "MISSING_INITIAL",
                ValidationError::UnresolvedInitial { .. } => "UNRESOLVED_INITIAL",
                ValidationError::DuplicateEvent { .. } => "DUPLICATE_EVENT",
                ValidationError::UnresolvedTarget { .. } => "UNRESOLVED_TARGET",
                ValidationError::FinalWithChildren { .. }
                | ValidationError::FinalWithTransitions { .. } => "MALFORMED_FINAL",
                ValidationError::InvalidBinding { .. } | ValidationError::ReservedKey { .. } => {
                    "INVALID_NAME"
                }
            },
        }
    }
}
