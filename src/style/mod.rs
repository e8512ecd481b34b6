pub mod builder;
pub mod cache;
pub mod patch;
pub mod primitives;
