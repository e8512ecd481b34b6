pub mod model;
pub mod pointer;
pub(crate) mod template;
