pub(crate) mod ast;
pub(crate) mod builtins;
pub(crate) mod clause;
pub(crate) mod error;
pub(crate) mod eval;
pub(crate) mod lexer;
pub(crate) mod parser;
