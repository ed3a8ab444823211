use crate::types::ParticleSystemId;
use thiserror::Error;

/// Configuration errors raised when an attractor is (re)targeted.
///
/// The attractor disables itself whenever one of these is returned;
/// assigning a valid particle system enables it again.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttractorError {
    /// No particle system is assigned.
    #[error("No particle system attached to particle attractor")]
    MissingParticleSystem,
    /// The assigned id does not resolve in the host.
    #[error("Particle system {0} does not exist in the host")]
    UnknownParticleSystem(ParticleSystemId),
}

/// Failure reported by an "attracted" handler.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        assert_eq!(
            AttractorError::MissingParticleSystem.to_string(),
            "No particle system attached to particle attractor"
        );
        assert_eq!(
            AttractorError::UnknownParticleSystem(3).to_string(),
            "Particle system 3 does not exist in the host"
        );
        let e = HandlerError::new("boom");
        assert_eq!(e.to_string(), "boom");
        assert_eq!(e.message(), "boom");
    }
}
