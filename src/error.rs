pub type PolylotResult<T> = Result<T, PolylotError>;

#[derive(thiserror::Error, Debug)]
pub enum PolylotError {
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    #[error("missing camera: {0}")]
    MissingCamera(String),

    #[error("unsupported topology change: {0}")]
    TopologyChange(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PolylotError {
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::InvalidTimeline(msg.into())
    }

    pub fn missing_camera(msg: impl Into<String>) -> Self {
        Self::MissingCamera(msg.into())
    }

    pub fn topology(msg: impl Into<String>) -> Self {
        Self::TopologyChange(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PolylotError::timeline("x")
                .to_string()
                .contains("invalid timeline:")
        );
        assert!(
            PolylotError::missing_camera("x")
                .to_string()
                .contains("missing camera:")
        );
        assert!(
            PolylotError::topology("x")
                .to_string()
                .contains("unsupported topology change:")
        );
        assert!(
            PolylotError::serialization("x")
                .to_string()
                .contains("serialization error:")
        );
        assert!(
            PolylotError::validation("x")
                .to_string()
                .contains("validation error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PolylotError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
