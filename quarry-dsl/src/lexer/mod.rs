//! Lexer module for the nested-relation DSL

pub mod token;
pub mod scanner;

pub use token::*;
pub use scanner::*;
