//! Core syntax types shared by the lexer, parser and evaluator

pub mod ast;
pub mod span;
pub mod token;
