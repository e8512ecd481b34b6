pub type StyleResult<T> = Result<T, StyleError>;

#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("compile error at {pointer}: {message}")]
    Compile { pointer: String, message: String },

    #[error("evaluation error: {0}")]
    Eval(String),

    #[error("build error: {0}")]
    Build(String),

    #[error("patch error: {0}")]
    Patch(String),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StyleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn compile(pointer: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Compile {
            pointer: pointer.into(),
            message: msg.into(),
        }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        Self::Eval(msg.into())
    }

    pub fn build(msg: impl Into<String>) -> Self {
        Self::Build(msg.into())
    }

    pub fn patch(msg: impl Into<String>) -> Self {
        Self::Patch(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StyleError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
