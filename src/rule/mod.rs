//! Rule expression parsing, combination and evaluation
//!
//! This module turns rule strings like `age > 30 AND department = 'Sales'`
//! into ASTs, folds several ASTs together, and evaluates them against
//! key-value data records.

mod ast;
pub mod cache;
mod catalog;
mod combiner;
mod evaluator;
mod modify;
pub mod parser;
mod tokenizer;
mod value;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use catalog::*;
pub use combiner::*;
pub use evaluator::*;
pub use modify::*;
pub use parser::{parse, parse_tokens, Parser, DEFAULT_MAX_DEPTH};
pub use tokenizer::*;
pub use value::*;
