/// Identifier for a particle system owned by a [`crate::host::ParticleHost`].
///
/// This is an index into the host's system arena, and is only meaningful
/// within the lifetime of that host.
pub type ParticleSystemId = usize;

/// Identifier for a UI-scaling container owned by a [`crate::host::ParticleHost`].
pub type ContainerId = usize;

/// Identifier for an attractor registered with a [`crate::updater::Updater`].
pub type AttractorId = usize;

/// Identifier for an "attracted" handler subscribed on a [`crate::attractor::Attractor`].
pub type HandlerId = usize;
