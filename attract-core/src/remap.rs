//! Mapping the attractor's world position into a particle system's
//! simulation space, including the UI canvas correction.
//!
//! A particle system nested under an enabled [`UiContainer`] that
//! manages it is rendered with the container's canvas scale rather
//! than its own transform scale. The destination then has to be
//! rescaled so that particles visually converge on the attractor.

use crate::{
    host::{ParticleHost, UiContainer},
    transform::Transform,
    types::{ContainerId, ParticleSystemId},
};
use glam::Vec3;

/// Coordinate frame particle positions are stored in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationSpace {
    /// Relative to the particle system's transform.
    #[default]
    Local,
    /// Absolute world coordinates.
    World,
}

/// Snapshot of the UI container state needed for remapping.
///
/// `canvas_scale` must not contain a zero component; the result of
/// [`SpaceRemapContext::inverse_canvas_scale`] is not finite otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpaceRemapContext {
    /// Container's own transform scale.
    pub container_local_scale: Vec3,
    /// Container's world position.
    pub container_position: Vec3,
    /// Scale the canvas renders the container's particles with.
    pub canvas_scale: Vec3,
    /// Absolute positioning skips the relative offset correction.
    pub absolute_mode: bool,
    /// Host is showing an edit-time preview instead of running.
    pub edit_preview: bool,
}

impl SpaceRemapContext {
    pub fn from_container(container: &UiContainer, edit_preview: bool) -> Self {
        Self {
            container_local_scale: container.transform.scale,
            container_position: container.transform.position,
            canvas_scale: container.canvas_scale,
            absolute_mode: container.absolute_mode,
            edit_preview,
        }
    }

    #[inline]
    pub fn inverse_canvas_scale(&self) -> Vec3 {
        self.canvas_scale.recip()
    }

    /// Local scale composed with the inverse canvas scale.
    #[inline]
    fn rescale(&self, v: Vec3) -> Vec3 {
        v * self.container_local_scale * self.inverse_canvas_scale()
    }
}

/// Computes the destination particles are pulled toward, expressed in
/// the particle system's simulation space.
///
/// ### Parameters
/// - `target` - Attractor world position.
/// - `system` - World transform of the particle system.
/// - `space` - The system's simulation space.
/// - `remap` - UI container snapshot, if the system is canvas-scaled.
///
/// ### Returns
/// The destination in simulation space. With no `remap` this is
/// `target` itself in world space, or `target` mapped into the system's
/// local frame in local space.
pub fn destination_position(
    target: Vec3,
    system: &Transform,
    space: SimulationSpace,
    remap: Option<&SpaceRemapContext>,
) -> Vec3 {
    let mut dst = match space {
        SimulationSpace::Local => system.inverse_transform_point(target),
        SimulationSpace::World => target,
    };

    let Some(ctx) = remap else {
        return dst;
    };

    dst = ctx.rescale(dst);

    if !ctx.absolute_mode {
        let diff = ctx.container_position - system.position;
        dst += diff * (ctx.canvas_scale - ctx.container_local_scale) * ctx.inverse_canvas_scale();
    }

    // World-space preview renders the system's own origin rescaled too.
    if ctx.edit_preview && space == SimulationSpace::World {
        dst += system.position - ctx.rescale(system.position);
    }

    dst
}

/// Finds the UI container that remaps `system`, if any.
///
/// The nearest ancestor container reported by the host is only kept if
/// it actually manages `system`.
pub fn resolve_container<H: ParticleHost + ?Sized>(
    host: &H,
    system: ParticleSystemId,
) -> Option<ContainerId> {
    let id = host.find_managing_container(system)?;
    host.container(id)
        .filter(|c| c.manages(system))
        .map(|_| id)
}
