use crate::{
    host::ParticleSystem,
    particle::{Particle, ParticleBuffer},
    remap::SimulationSpace,
};
use glam::Vec3;
use rand::Rng;
use std::ops::RangeInclusive;

/// Continuous particle source for a [`ParticleSystem`].
///
/// Particles spawn at the system origin (expressed in its simulation
/// space) and fly off in a random direction.
#[derive(Clone, Debug)]
pub struct Emitter {
    /// Particles per second.
    pub rate: f32,
    pub speed: RangeInclusive<f32>,
    pub lifetime: RangeInclusive<f32>,
    /// Keep emitted velocities in the XY plane.
    pub planar: bool,
    accumulator: f32,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            rate: 60.0,
            speed: 20.0..=60.0,
            lifetime: 2.0..=4.0,
            planar: true,
            accumulator: 0.0,
        }
    }
}

impl Emitter {
    pub fn new(rate: f32, speed: RangeInclusive<f32>, lifetime: RangeInclusive<f32>) -> Self {
        Self {
            rate,
            speed,
            lifetime,
            ..Self::default()
        }
    }

    /// Draws one particle at `origin`.
    pub fn spawn(&self, origin: Vec3, rng: &mut impl Rng) -> Particle {
        let dir = if self.planar {
            let a = rng.random_range(0.0..std::f32::consts::TAU);
            Vec3::new(a.cos(), a.sin(), 0.0)
        } else {
            let z: f32 = rng.random_range(-1.0..=1.0);
            let a = rng.random_range(0.0..std::f32::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            Vec3::new(r * a.cos(), r * a.sin(), z)
        };
        let speed = rng.random_range(self.speed.clone());
        let lifetime = rng.random_range(self.lifetime.clone());
        Particle::new(origin, dir * speed, lifetime)
    }

    /// Emits up to `count` particles into `buffer`.
    ///
    /// ### Returns
    /// How many particles were actually emitted before the buffer filled up.
    pub fn burst(
        &self,
        buffer: &mut ParticleBuffer,
        origin: Vec3,
        count: usize,
        rng: &mut impl Rng,
    ) -> usize {
        let mut emitted = 0;
        for _ in 0..count {
            if !buffer.emit(self.spawn(origin, rng)) {
                break;
            }
            emitted += 1;
        }
        emitted
    }

    /// Emits the particles due after `dt` seconds at the configured rate.
    pub fn update(&mut self, system: &mut ParticleSystem, dt: f32, rng: &mut impl Rng) -> usize {
        self.accumulator += self.rate * dt;
        let due = self.accumulator.floor();
        self.accumulator -= due;

        let origin = match system.simulation_space {
            SimulationSpace::Local => Vec3::ZERO,
            SimulationSpace::World => system.transform.position,
        };
        self.burst(&mut system.particles, origin, due as usize, rng)
    }
}

/// Advances every live particle by `dt` seconds and drops the dead ones.
///
/// ### Returns
/// The number of particles removed.
pub fn integrate(buffer: &mut ParticleBuffer, dt: f32) -> usize {
    for p in buffer.live_mut() {
        p.position += p.velocity * dt;
        p.remaining_lifetime -= dt;
    }
    buffer.retain_alive()
}
