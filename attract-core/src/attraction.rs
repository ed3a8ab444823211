//! Per-tick attraction update.
//!
//! For each live particle:
//! 1. Dead particles (`remaining_lifetime <= 0`) are left untouched.
//! 2. Particles within `destination_radius` of the destination are
//!    killed and reported as [`Attracted`].
//! 3. Particles still in their delay phase keep their state.
//! 4. Everything else steps toward the destination according to
//!    [`Movement`](crate::config::Movement), and its velocity is halved.
//!
//! Particles do not interact, so the order of processing is irrelevant.

use crate::{
    config::AttractorConfig,
    motion,
    particle::Particle,
    remap::{self, SimulationSpace, SpaceRemapContext},
    transform::Transform,
};
use glam::Vec3;

/// A particle reached the capture radius this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attracted {
    /// Index of the particle in the slice passed to [`update`].
    pub index: usize,
}

/// Timing of a particle's attraction phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    /// Lifetime spent waiting before attraction begins.
    pub delay_time: f32,
    /// Length of the active attraction phase.
    pub duration: f32,
    /// Time spent in the active phase, clamped to `>= 0`.
    pub elapsed: f32,
}

impl Phase {
    pub fn of(particle: &Particle, delay_rate: f32) -> Self {
        let delay_time = particle.start_lifetime * delay_rate;
        let duration = particle.start_lifetime - delay_time;
        let elapsed = (particle.age() - delay_time).max(0.0);
        Self {
            delay_time,
            duration,
            elapsed,
        }
    }

    #[inline]
    pub fn is_delayed(&self) -> bool {
        self.elapsed <= 0.0
    }
}

/// Runs one attraction tick over `particles` toward `destination`.
///
/// `destination` must already be in the particles' simulation space,
/// see [`remap::destination_position`].
///
/// ### Returns
/// One [`Attracted`] per particle captured this tick, in index order.
pub fn update(
    particles: &mut [Particle],
    config: &AttractorConfig,
    destination: Vec3,
) -> Vec<Attracted> {
    let radius = config.destination_radius();
    let mut attracted = Vec::new();

    for (index, p) in particles.iter_mut().enumerate() {
        if !p.is_alive() {
            continue;
        }

        if p.position.distance(destination) < radius {
            p.remaining_lifetime = 0.0;
            attracted.push(Attracted { index });
            continue;
        }

        let phase = Phase::of(p, config.delay_rate());
        if phase.is_delayed() {
            continue;
        }

        p.position = motion::attracted_position(
            p.position,
            destination,
            phase.duration,
            phase.elapsed,
            config.max_speed(),
            config.movement(),
        );
        p.velocity *= 0.5;
    }

    attracted
}

/// Computes the destination from world-space inputs, then runs [`update`].
pub fn update_in_space(
    particles: &mut [Particle],
    config: &AttractorConfig,
    target: Vec3,
    system: &Transform,
    space: SimulationSpace,
    remap: Option<&SpaceRemapContext>,
) -> Vec<Attracted> {
    let destination = remap::destination_position(target, system, space, remap);
    update(particles, config, destination)
}
