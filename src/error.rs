//! Centralised error hierarchy for the **Tinj interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  This enables
//! a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! The module **does not** print diagnostics itself; that is the job of the
//! session reporter.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};
use crate::value::Value;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TinjError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human-readable description.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error. `location` is `" at end"` for EOF, or
    /// `" at '<lexeme>'"` for any other token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static-analysis (resolution) failure, formatted like a parse error.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error. Carries the line of the offending token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Non-local exit carrying the value of a `return` statement. Internal
    /// control flow only: caught at the function-call boundary, never
    /// reported as a diagnostic.
    #[error("return outside of a function")]
    Return(Value),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF-8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl TinjError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        TinjError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        TinjError::Parse {
            message,
            location: error_location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        TinjError::Resolve {
            message,
            location: error_location(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **evaluator**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        TinjError::Runtime {
            message: msg.into(),
            line,
        }
    }
}

fn error_location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TinjError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_token() {
        let token = Token::new(TokenType::SEMICOLON, ";".to_string(), 3);
        let err = TinjError::parse(&token, "Expect expression.");
        assert_eq!(err.to_string(), "[line 3] Error at ';': Expect expression.");
    }

    #[test]
    fn parse_error_at_eof() {
        let token = Token::new(TokenType::EOF, String::new(), 7);
        let err = TinjError::parse(&token, "Expect ';' after value.");
        assert_eq!(
            err.to_string(),
            "[line 7] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn runtime_error_trails_the_line() {
        let err = TinjError::runtime(2, "Operands must be numbers.");
        assert_eq!(err.to_string(), "Operands must be numbers.\n[line 2]");
    }
}
