//! Named numeric uniforms and the tunable-parameter surface.

mod block;
mod params;

pub use block::{UniformBlock, UniformValue};
pub use params::{ParamSpec, Tunable};

/// Uniform write failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniformError {
    #[error("unknown uniform `{0}`")]
    Unknown(String),

    #[error("uniform `{name}` is {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Parameter write failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    Unknown(String),

    #[error("parameter `{0}` must be finite")]
    NotFinite(String),

    #[error(transparent)]
    Uniform(#[from] UniformError),
}
