/// GPU object creation failures surfaced by renderers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// wgpu rejected a shader module or pipeline built for `label`.
    #[error("`{label}` failed validation: {message}")]
    Validation { label: String, message: String },

    /// A resource expected after lazy creation was missing.
    #[error("`{label}` is missing its {resource}")]
    Missing { label: String, resource: &'static str },
}

impl RenderError {
    pub(crate) fn missing(label: &str, resource: &'static str) -> Self {
        Self::Missing {
            label: label.to_string(),
            resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_resource() {
        let err = RenderError::Validation {
            label: "grain".into(),
            message: "entry point `vs_main` not found".into(),
        };
        assert_eq!(err.to_string(), "`grain` failed validation: entry point `vs_main` not found");
        assert_eq!(RenderError::missing("fxaa", "sampler").to_string(), "`fxaa` is missing its sampler");
    }
}
