//! Error types for the LDL compiler.

use thiserror::Error;

use super::token::{Token, TokenKind};

/// An error that occurred while compiling a level definition.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{line}:{col}] {kind}: {message}")]
pub struct CompileError {
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("unexpected token (expected {expected}, found {found})")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },
    #[error("invalid mapping")]
    InvalidMapping,
    #[error("ragged rows")]
    RaggedRows,
}

impl CompileError {
    pub fn unexpected(expected: TokenKind, found: &Token) -> Self {
        Self {
            message: format!("expected {expected}, got {found}"),
            line: found.line,
            col: found.col,
            kind: ErrorKind::UnexpectedToken {
                expected,
                found: found.kind,
            },
        }
    }

    pub fn invalid_mapping(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::InvalidMapping,
        }
    }

    pub fn ragged_rows(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::RaggedRows,
        }
    }
}
