//! Vector stepping and interpolation used by the attraction update.

use crate::config::Movement;
use glam::{Quat, Vec3};

const EPSILON: f32 = 1e-5;

/// Moves `current` toward `target` by at most `max_delta`.
///
/// Returns `target` itself once it is within reach, so the result never
/// overshoots. A negative `max_delta` moves away from `target`.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let d2 = to_target.length_squared();
    if d2 == 0.0 || (max_delta >= 0.0 && d2 <= max_delta * max_delta) {
        return target;
    }
    current + to_target / d2.sqrt() * max_delta
}

/// Spherical interpolation between two vectors treated as directions
/// from the origin.
///
/// The direction rotates along the great circle from `a` to `b` while
/// the length is linearly interpolated. `t` is clamped to `[0, 1]`.
/// Near-zero or near-parallel inputs fall back to a plain lerp;
/// antiparallel inputs rotate about an arbitrary orthogonal axis.
pub fn slerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let a_len = a.length();
    let b_len = b.length();
    if a_len < EPSILON || b_len < EPSILON {
        return a.lerp(b, t);
    }

    let len = a_len + (b_len - a_len) * t;
    let a_dir = a / a_len;
    let cos = (a.dot(b) / (a_len * b_len)).clamp(-1.0, 1.0);

    if cos > 1.0 - EPSILON {
        return a.lerp(b, t);
    }

    let (axis, angle) = if cos < -1.0 + EPSILON {
        (a_dir.any_orthonormal_vector(), std::f32::consts::PI * t)
    } else {
        (a.cross(b).normalize(), cos.acos() * t)
    };

    Quat::from_axis_angle(axis, angle) * a_dir * len
}

/// Computes where a particle moves this tick while it is being attracted.
///
/// ### Parameters
/// - `current` - Particle position.
/// - `destination` - Remapped attractor position.
/// - `duration` - Length of the active attraction phase.
/// - `elapsed` - Time spent in the active phase so far (`> 0`).
/// - `max_speed` - Configured speed cap.
/// - `movement` - Interpolation law.
///
/// ### Returns
/// The new particle position, at most one speed step from `current`.
pub fn attracted_position(
    current: Vec3,
    destination: Vec3,
    duration: f32,
    elapsed: f32,
    max_speed: f32,
    movement: Movement,
) -> Vec3 {
    let (target, speed) = match movement {
        Movement::Linear => (destination, max_speed / duration),
        Movement::Smooth => (current.lerp(destination, elapsed / duration), max_speed),
        Movement::Sphere => (slerp(current, destination, elapsed / duration), max_speed),
    };
    move_towards(current, target, speed)
}
