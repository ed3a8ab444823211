use std::ops::RangeInclusive;

/// Allowed range for [`AttractorConfig::destination_radius`].
pub const DESTINATION_RADIUS_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Range the delay rate is edited in. Not enforced by the setter.
pub const DELAY_RATE_RANGE: RangeInclusive<f32> = 0.0..=0.95;

/// Range the max speed is edited in. Not enforced by the setter.
pub const MAX_SPEED_RANGE: RangeInclusive<f32> = 0.001..=100.0;

/// Interpolation law used while a particle is being attracted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Movement {
    /// Straight line at `max_speed / duration` per tick.
    #[default]
    Linear,
    /// Chases a target lerped toward the destination, at `max_speed` per tick.
    Smooth,
    /// Like [`Movement::Smooth`] but the target is slerped, giving a curved path.
    Sphere,
}

impl Movement {
    pub const ALL: [Movement; 3] = [Movement::Linear, Movement::Smooth, Movement::Sphere];

    pub fn label(self) -> &'static str {
        match self {
            Movement::Linear => "Linear",
            Movement::Smooth => "Smooth",
            Movement::Sphere => "Sphere",
        }
    }
}

/// Attraction settings of a single attractor.
///
/// Only the destination radius is clamped on write. `delay_rate` and
/// `max_speed` are stored as given; [`DELAY_RATE_RANGE`] and
/// [`MAX_SPEED_RANGE`] are meant for editing widgets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttractorConfig {
    destination_radius: f32,
    delay_rate: f32,
    max_speed: f32,
    movement: Movement,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            destination_radius: 1.0,
            delay_rate: 0.0,
            max_speed: 1.0,
            movement: Movement::Linear,
        }
    }
}

impl AttractorConfig {
    /// Capture radius around the destination.
    pub fn destination_radius(&self) -> f32 {
        self.destination_radius
    }

    /// Sets the capture radius, clamped into [`DESTINATION_RADIUS_RANGE`].
    pub fn set_destination_radius(&mut self, radius: f32) {
        self.destination_radius =
            radius.clamp(*DESTINATION_RADIUS_RANGE.start(), *DESTINATION_RADIUS_RANGE.end());
    }

    /// Fraction of a particle's lifetime spent before attraction starts.
    pub fn delay_rate(&self) -> f32 {
        self.delay_rate
    }

    pub fn set_delay_rate(&mut self, rate: f32) {
        self.delay_rate = rate;
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn set_max_speed(&mut self, speed: f32) {
        self.max_speed = speed;
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    pub fn set_movement(&mut self, movement: Movement) {
        self.movement = movement;
    }

    pub fn with_destination_radius(mut self, radius: f32) -> Self {
        self.set_destination_radius(radius);
        self
    }

    pub fn with_delay_rate(mut self, rate: f32) -> Self {
        self.set_delay_rate(rate);
        self
    }

    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.set_max_speed(speed);
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.set_movement(movement);
        self
    }
}
