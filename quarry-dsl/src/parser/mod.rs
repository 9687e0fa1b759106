//! Parser module for the nested-relation DSL

pub mod ast;
pub mod flat;
pub mod parser;
pub mod tree;

pub use ast::*;
pub use flat::*;
pub use parser::*;
pub use tree::*;
