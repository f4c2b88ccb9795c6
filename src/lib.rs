pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod resolver;
pub mod scanner;
mod stack;
pub mod token;
pub mod value;

pub use error::{LoxError, Result};
pub use lox::{Lox, Report};
