//! Interpreter session: the pipeline driver and its diagnostics collaborator.
//!
//! A [`Session`] owns one persistent [`Interpreter`] plus a [`Reporter`], so
//! definitions survive across `run` calls (the REPL runs one line per call)
//! and error state lives in an object instead of process-wide statics.

use std::io::{self, Write};

use log::info;

use crate::error::TinjError;
use crate::expr::ExprId;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// Collects diagnostics and tracks the per-run error flags. Messages go to
/// stderr in the formats the error variants render themselves in.
#[derive(Debug, Default)]
pub struct Reporter {
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter::default()
    }

    /// Report a scan, parse, or resolution error.
    pub fn report(&mut self, err: &TinjError) {
        eprintln!("{}", err);
        self.had_error = true;
    }

    /// Report an evaluation error.
    pub fn report_runtime(&mut self, err: &TinjError) {
        eprintln!("{}", err);
        self.had_runtime_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }
}

/// What one `run` call produced, for the driver's exit-code decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub had_syntax_error: bool,
    pub had_runtime_error: bool,
}

/// One interpreter session. `print` output goes to the injected writer;
/// diagnostics go to stderr via the [`Reporter`].
pub struct Session<W: Write> {
    reporter: Reporter,
    interpreter: Interpreter<W>,
    next_expr_id: ExprId,
}

impl Session<io::Stdout> {
    pub fn new() -> Self {
        Session::with_output(io::stdout())
    }
}

impl Default for Session<io::Stdout> {
    fn default() -> Self {
        Session::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(output: W) -> Self {
        Session {
            reporter: Reporter::new(),
            interpreter: Interpreter::new(output),
            next_expr_id: 0,
        }
    }

    /// Run `source` through the staged pipeline: scan, parse, resolve,
    /// evaluate. Each stage is skipped once the error flag is set. Flags are
    /// fresh per call; definitions persist between calls.
    pub fn run(&mut self, source: &str) -> RunOutcome {
        self.reporter.reset();

        info!("Running {} byte(s) of source", source.len());

        let mut tokens: Vec<Token> = Vec::new();
        for item in Scanner::new(source.as_bytes()) {
            match item {
                Ok(token) => tokens.push(token),
                Err(err) => self.reporter.report(&err),
            }
        }

        let mut parser = Parser::new(tokens, self.next_expr_id, &mut self.reporter);
        let statements = parser.parse();
        self.next_expr_id = parser.next_id();

        if self.reporter.had_error() {
            return self.outcome();
        }

        let locals = Resolver::new(&mut self.reporter).resolve(&statements);

        if self.reporter.had_error() {
            return self.outcome();
        }

        self.interpreter.add_locals(locals);

        if let Err(err) = self.interpreter.interpret(&statements) {
            self.reporter.report_runtime(&err);
        }

        self.outcome()
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    fn outcome(&self) -> RunOutcome {
        RunOutcome {
            had_syntax_error: self.reporter.had_error(),
            had_runtime_error: self.reporter.had_runtime_error(),
        }
    }
}
