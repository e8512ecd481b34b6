pub mod compile;
pub mod function;
