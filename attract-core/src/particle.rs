use glam::Vec3;

/// Transient state of one emitted particle.
///
/// `position` is expressed in the owning system's simulation space.
/// `start_lifetime` is fixed at emission, `remaining_lifetime` counts
/// down to zero; a particle with `remaining_lifetime <= 0` is dead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub start_lifetime: f32,
    pub remaining_lifetime: f32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, lifetime: f32) -> Self {
        Self {
            position,
            velocity,
            start_lifetime: lifetime,
            remaining_lifetime: lifetime,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.remaining_lifetime > 0.0
    }

    /// Seconds elapsed since emission.
    #[inline]
    pub fn age(&self) -> f32 {
        self.start_lifetime - self.remaining_lifetime
    }
}

/// Fixed-capacity particle storage with a live count.
///
/// Only the first `live_count` slots hold particles the simulation
/// cares about; [`ParticleBuffer::live`] and [`ParticleBuffer::live_mut`]
/// expose exactly that sub-range.
#[derive(Debug)]
pub struct ParticleBuffer {
    slots: Vec<Particle>,
    capacity: usize,
}

impl ParticleBuffer {
    /// Creates an empty buffer able to hold at most `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Appends a particle to the live range.
    ///
    /// ### Returns
    /// `false` (and drops the particle) if the buffer is already full.
    pub fn emit(&mut self, particle: Particle) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots.push(particle);
        true
    }

    pub fn live(&self) -> &[Particle] {
        &self.slots
    }

    pub fn live_mut(&mut self) -> &mut [Particle] {
        &mut self.slots
    }

    /// Removes dead particles from the live range, preserving the order
    /// of the survivors.
    ///
    /// ### Returns
    /// The number of particles removed.
    pub fn retain_alive(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(Particle::is_alive);
        before - self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
