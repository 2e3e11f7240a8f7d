//! The Lello expression calculator: a small C-like scalar expression
//! language used for enabling predicates, post-firing token rewrites, and
//! clock-rate expressions.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use value::{Bindings, Value, VarBindings};

use crate::error::CoreResult;

/// Parse and immediately evaluate an expression against `bindings`. Most
/// callers parse once (at net-construction time) and evaluate many times;
/// this is a convenience for the common one-shot case (tests, REPL-style
/// tools).
pub fn eval_str(src: &str, bindings: &dyn Bindings) -> CoreResult<Value> {
    let expr = parser::parse(src)?;
    eval::eval(&expr, bindings)
}
