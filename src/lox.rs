//! One interpreter session: scan → parse → resolve → interpret.
//!
//! A [`Lox`] owns a single [`Interpreter`], so globals defined by one call
//! to [`Lox::run`] are visible to the next (this is what the REPL relies
//! on).  Error state is not kept in globals; every run returns a [`Report`].

use std::io::Write;

use log::{debug, info};

use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::{Parsed, Parser};
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// Diagnostics produced by one [`Lox::run`].
#[derive(Debug, Default)]
pub struct Report {
    /// Lexical, syntax and resolution errors, in the order found.
    pub static_errors: Vec<LoxError>,

    /// The runtime error that halted the program, if any.
    pub runtime_error: Option<LoxError>,
}

impl Report {
    /// Any static error means the program was never executed.
    pub fn had_error(&self) -> bool {
        !self.static_errors.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.runtime_error.is_some()
    }

    /// All diagnostics, static first.
    pub fn errors(&self) -> impl Iterator<Item = &LoxError> {
        self.static_errors.iter().chain(self.runtime_error.iter())
    }
}

pub struct Lox {
    interpreter: Interpreter,
    /// Next free expression id; ids must stay unique across runs because
    /// closures from earlier runs keep their resolved nodes alive.
    next_id: usize,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session whose `print` output goes to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            next_id: 0,
        }
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            next_id: 0,
        }
    }

    /// Run `source` to completion.  Execution only happens when scanning,
    /// parsing and resolution were all error free.
    pub fn run(&mut self, source: &str) -> Report {
        let mut report = Report::default();

        let mut tokens: Vec<Token> = Vec::new();
        for result in Scanner::new(source) {
            match result {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    debug!("Scan error: {}", e);
                    report.static_errors.push(e);
                }
            }
        }

        let Parsed {
            statements,
            errors,
            next_id,
        } = Parser::new(tokens).starting_at(self.next_id).parse();
        self.next_id = next_id;
        report.static_errors.extend(errors);

        if report.had_error() {
            info!("Skipping resolution: {} static error(s)", report.static_errors.len());
            return report;
        }

        let errors: Vec<LoxError> = Resolver::new(&mut self.interpreter).resolve(&statements);
        report.static_errors.extend(errors);

        if report.had_error() {
            info!("Skipping execution: {} static error(s)", report.static_errors.len());
            return report;
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            debug!("Runtime error on line {:?}: {}", e.line(), e);
            report.runtime_error = Some(e);
        }

        report
    }
}
