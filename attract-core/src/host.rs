//! Host-side scene objects the attractor reads and writes.
//!
//! The attraction core never walks a scene graph. It talks to the host
//! through [`ParticleHost`], which exposes particle systems, UI
//! containers and the nearest-ancestor query. [`Stage`] is a small
//! arena-backed host used by the viewer and the tests.

use crate::{
    particle::ParticleBuffer,
    remap::SimulationSpace,
    transform::Transform,
    types::{ContainerId, ParticleSystemId},
};
use glam::Vec3;

/// A particle emitter with its own transform and live particle buffer.
#[derive(Debug)]
pub struct ParticleSystem {
    pub transform: Transform,
    pub simulation_space: SimulationSpace,
    pub particles: ParticleBuffer,
    /// Nearest UI container above this system in the hierarchy.
    pub ui_parent: Option<ContainerId>,
}

impl ParticleSystem {
    pub fn new(transform: Transform, simulation_space: SimulationSpace, capacity: usize) -> Self {
        Self {
            transform,
            simulation_space,
            particles: ParticleBuffer::with_capacity(capacity),
            ui_parent: None,
        }
    }
}

/// A UI element that renders particle systems at canvas scale.
#[derive(Debug)]
pub struct UiContainer {
    /// World position and local scale of the container.
    pub transform: Transform,
    /// Per-axis scale the canvas applies to managed particles.
    pub canvas_scale: Vec3,
    pub absolute_mode: bool,
    pub enabled: bool,
    managed: Vec<ParticleSystemId>,
}

impl UiContainer {
    pub fn new(transform: Transform, canvas_scale: Vec3) -> Self {
        Self {
            transform,
            canvas_scale,
            absolute_mode: false,
            enabled: true,
            managed: Vec::new(),
        }
    }

    pub fn manages(&self, system: ParticleSystemId) -> bool {
        self.managed.contains(&system)
    }

    pub fn managed(&self) -> &[ParticleSystemId] {
        &self.managed
    }

    pub fn add_managed(&mut self, system: ParticleSystemId) {
        if !self.manages(system) {
            self.managed.push(system);
        }
    }

    pub fn remove_managed(&mut self, system: ParticleSystemId) {
        self.managed.retain(|&s| s != system);
    }
}

/// Access the attractor needs to the surrounding simulation.
pub trait ParticleHost {
    fn system(&self, id: ParticleSystemId) -> Option<&ParticleSystem>;

    fn system_mut(&mut self, id: ParticleSystemId) -> Option<&mut ParticleSystem>;

    fn container(&self, id: ContainerId) -> Option<&UiContainer>;

    /// Nearest UI container above `system`, whether or not it manages it.
    fn find_managing_container(&self, system: ParticleSystemId) -> Option<ContainerId>;

    /// `false` while the host only shows an edit-time preview.
    fn is_playing(&self) -> bool {
        true
    }
}

/// Arena-backed [`ParticleHost`].
#[derive(Debug)]
pub struct Stage {
    pub systems: Vec<ParticleSystem>,
    pub containers: Vec<UiContainer>,
    pub playing: bool,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            systems: Vec::new(),
            containers: Vec::new(),
            playing: true,
        }
    }
}

impl Stage {
    pub fn add_system(&mut self, system: ParticleSystem) -> ParticleSystemId {
        let id = self.systems.len();
        self.systems.push(system);
        id
    }

    pub fn add_container(&mut self, container: UiContainer) -> ContainerId {
        let id = self.containers.len();
        self.containers.push(container);
        id
    }

    /// Reparents `system` in the hierarchy without touching any managed set.
    ///
    /// ### Panics
    /// Panics if `system` is out of bounds.
    pub fn set_ui_parent(&mut self, system: ParticleSystemId, parent: Option<ContainerId>) {
        self.systems[system].ui_parent = parent;
    }

    /// Parents `system` under `container` and lets the container manage it.
    ///
    /// ### Panics
    /// Panics if either id is out of bounds.
    pub fn attach(&mut self, system: ParticleSystemId, container: ContainerId) {
        if let Some(old) = self.systems[system].ui_parent
            && old != container
        {
            self.containers[old].remove_managed(system);
        }
        self.systems[system].ui_parent = Some(container);
        self.containers[container].add_managed(system);
    }

    /// Removes `system` from its container, if any.
    ///
    /// ### Panics
    /// Panics if `system` is out of bounds.
    pub fn detach(&mut self, system: ParticleSystemId) {
        if let Some(old) = self.systems[system].ui_parent.take() {
            self.containers[old].remove_managed(system);
        }
    }
}

impl ParticleHost for Stage {
    fn system(&self, id: ParticleSystemId) -> Option<&ParticleSystem> {
        self.systems.get(id)
    }

    fn system_mut(&mut self, id: ParticleSystemId) -> Option<&mut ParticleSystem> {
        self.systems.get_mut(id)
    }

    fn container(&self, id: ContainerId) -> Option<&UiContainer> {
        self.containers.get(id)
    }

    fn find_managing_container(&self, system: ParticleSystemId) -> Option<ContainerId> {
        self.systems.get(system)?.ui_parent
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
