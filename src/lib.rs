// SPDX: CC0-1.0

//! Plot the implicit curve `f(x, y) = 0` by marking every pixel whose corners disagree on
//! the sign of `f`.

pub mod eval;
pub mod interact;
pub mod lex;
pub mod parse;
pub mod render;
pub mod scan;
pub mod shell;
pub mod stdlib;
pub mod viewport;

use eval::Evaluator;
use lex::Lexer;
use parse::CompileError;
use std::sync::Arc;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// Compile an expression over `x` and `y` into an evaluator.
pub fn compile(source: &str) -> Result<Evaluator, CompileError> {
    let src = Arc::new(source.to_string());
    let root = parse::parse(Lexer::new(&src), &stdlib::standard_idents())?;
    Ok(Evaluator::new(root, src))
}
