//! Particle attraction toward a target point, with UI canvas remapping.
//!
//! Main components:
//! - [`attraction`] — the per-tick attraction update over a particle slice.
//! - [`motion`] — stepping and interpolation laws (linear, lerp, slerp).
//! - [`remap`] — destination mapping into simulation and canvas space.
//! - [`config`] — attractor settings and their accessors.
//! - [`attractor`] — attractor component with target, cache and handlers.
//! - [`updater`] — registry that ticks attractors once per frame.
//! - [`host`] — particle systems, UI containers and the host trait.
//! - [`particle`] — particle state and fixed-capacity buffers.
//! - [`emitter`] — random emission and integration for the host simulation.
//! - [`transform`] — world transforms of scene objects.
//! - [`error`] — configuration and handler errors.
//! - [`types`] — shared id aliases.

pub mod attraction;
pub mod attractor;
pub mod config;
pub mod emitter;
pub mod error;
pub mod host;
pub mod motion;
pub mod particle;
pub mod remap;
pub mod transform;
pub mod types;
pub mod updater;
