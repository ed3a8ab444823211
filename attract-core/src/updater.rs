//! Per-frame driver for registered attractors.
//!
//! The host registers attractors once and calls [`Updater::tick`] every
//! simulation frame. Each enabled attractor runs exactly once per tick,
//! then its "attracted" handlers are dispatched. Attractors are
//! independent, so callers must not rely on the visiting order.

use crate::{attractor::Attractor, host::ParticleHost, types::AttractorId};
use tracing::{debug, trace};

/// Summary of one [`Updater::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Enabled attractors that ran.
    pub ticked: usize,
    /// Particles captured across all attractors.
    pub attracted: usize,
    /// Handler invocations that returned an error or panicked.
    pub handler_failures: usize,
}

/// Registry of attractors driven once per frame.
///
/// Ids index into `slots` and are never reused. Unregistering leaves a
/// `None` slot behind, so storage grows by one slot per registration
/// for the lifetime of the updater.
#[derive(Debug, Default)]
pub struct Updater {
    slots: Vec<Option<Attractor>>,
}

impl Updater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attractor and returns a fresh id.
    pub fn register(&mut self, attractor: Attractor) -> AttractorId {
        let id = self.slots.len();
        self.slots.push(Some(attractor));
        debug!(attractor = id, "attractor registered");
        id
    }

    /// Removes an attractor, handing it back to the caller.
    pub fn unregister(&mut self, id: AttractorId) -> Option<Attractor> {
        let removed = self.slots.get_mut(id)?.take();
        if removed.is_some() {
            debug!(attractor = id, "attractor unregistered");
        }
        removed
    }

    pub fn get(&self, id: AttractorId) -> Option<&Attractor> {
        self.slots.get(id)?.as_ref()
    }

    pub fn get_mut(&mut self, id: AttractorId) -> Option<&mut Attractor> {
        self.slots.get_mut(id)?.as_mut()
    }

    /// Number of registered attractors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttractorId, &Attractor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, s)| s.as_ref().map(|a| (id, a)))
    }

    /// Runs every enabled attractor once against `host`.
    ///
    /// Disabled attractors stay registered but are skipped. Handler
    /// errors and panics are counted in the report and never abort the
    /// tick.
    pub fn tick<H: ParticleHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let mut report = TickReport::default();

        for (id, slot) in self.slots.iter_mut().enumerate() {
            let Some(attractor) = slot.as_mut().filter(|a| a.is_enabled()) else {
                continue;
            };

            let events = attractor.attract(host);
            report.ticked += 1;
            report.attracted += events.len();
            report.handler_failures += attractor.dispatch(&events);

            if !events.is_empty() {
                trace!(attractor = id, attracted = events.len(), "attractor tick");
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AttractorConfig,
        error::HandlerError,
        host::{ParticleSystem, Stage},
        particle::Particle,
        remap::SimulationSpace,
        transform::Transform,
    };
    use glam::Vec3;
    use std::{cell::Cell, rc::Rc};

    fn stage_with_particles(positions: &[Vec3]) -> Stage {
        let mut stage = Stage::default();
        let id = stage.add_system(ParticleSystem::new(
            Transform::IDENTITY,
            SimulationSpace::World,
            32,
        ));
        for &p in positions {
            stage.systems[id].particles.emit(Particle::new(p, Vec3::ZERO, 5.0));
        }
        stage
    }

    fn enabled_attractor(stage: &Stage, at: Vec3) -> Attractor {
        let mut a = Attractor::new(AttractorConfig::default(), Transform::from_position(at));
        a.set_particle_system(stage, Some(0)).unwrap();
        a
    }

    #[test]
    fn register_and_unregister() {
        let stage = stage_with_particles(&[]);
        let mut updater = Updater::new();
        assert!(updater.is_empty());

        let a = updater.register(enabled_attractor(&stage, Vec3::ZERO));
        let b = updater.register(enabled_attractor(&stage, Vec3::ONE));
        assert_eq!(updater.len(), 2);
        assert_ne!(a, b);

        assert!(updater.unregister(a).is_some());
        assert!(updater.unregister(a).is_none());
        assert!(updater.get(a).is_none());
        assert!(updater.get(b).is_some());
        assert_eq!(updater.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![b]);

        // Ids are not reused.
        let c = updater.register(enabled_attractor(&stage, Vec3::ZERO));
        assert_ne!(c, a);

        updater.unregister(b);
        updater.unregister(c);
        assert!(updater.is_empty());
        assert_eq!(updater.len(), 0);
    }

    #[test]
    fn tick_runs_enabled_attractors_and_skips_disabled() {
        let mut stage = stage_with_particles(&[Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)]);
        let mut updater = Updater::new();

        updater.register(enabled_attractor(&stage, Vec3::ZERO));
        let far = updater.register(enabled_attractor(&stage, Vec3::new(20.0, 0.0, 0.0)));
        updater.get_mut(far).unwrap().disable();

        let report = updater.tick(&mut stage);

        assert_eq!(report.ticked, 1);
        assert_eq!(report.attracted, 1);
        let live = stage.systems[0].particles.live();
        assert!(!live[0].is_alive());
        assert!(live[1].is_alive());
    }

    #[test]
    fn handler_failure_does_not_abort_other_attractors() {
        let mut stage = stage_with_particles(&[Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)]);
        let mut updater = Updater::new();
        let fired = Rc::new(Cell::new(0));

        let mut failing = enabled_attractor(&stage, Vec3::ZERO);
        failing.on_attracted(|| Err(HandlerError::new("handler exploded")));
        updater.register(failing);

        let mut counting = enabled_attractor(&stage, Vec3::new(20.0, 0.0, 0.0));
        let counter = Rc::clone(&fired);
        counting.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        updater.register(counting);

        let report = updater.tick(&mut stage);

        assert_eq!(
            report,
            TickReport {
                ticked: 2,
                attracted: 2,
                handler_failures: 1,
            }
        );
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn panicking_handler_does_not_skip_later_attractors() {
        let mut stage = stage_with_particles(&[Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)]);
        let mut updater = Updater::new();
        let fired = Rc::new(Cell::new(0));

        let mut panicking = enabled_attractor(&stage, Vec3::ZERO);
        panicking.on_attracted(|| panic!("handler blew up"));
        updater.register(panicking);

        let mut counting = enabled_attractor(&stage, Vec3::new(20.0, 0.0, 0.0));
        let counter = Rc::clone(&fired);
        counting.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        updater.register(counting);

        let report = updater.tick(&mut stage);

        assert_eq!(report.ticked, 2);
        assert_eq!(report.attracted, 2);
        assert_eq!(report.handler_failures, 1);
        assert_eq!(fired.get(), 1);
        assert!(!stage.systems[0].particles.live()[1].is_alive());
    }

    #[test]
    fn tick_on_empty_updater_reports_nothing() {
        let mut stage = stage_with_particles(&[Vec3::ZERO]);
        let report = Updater::new().tick(&mut stage);
        assert_eq!(report, TickReport::default());
        assert!(stage.systems[0].particles.live()[0].is_alive());
    }
}
