use crate::{
    attraction::{self, Attracted},
    config::AttractorConfig,
    error::{AttractorError, HandlerError},
    host::{ParticleHost, ParticleSystem},
    remap::{self, SpaceRemapContext},
    transform::Transform,
    types::{ContainerId, HandlerId, ParticleSystemId},
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};
use tracing::{debug, error, warn};

/// Callback fired once per captured particle.
pub type AttractedHandler = Box<dyn FnMut() -> Result<(), HandlerError>>;

/// A point that pulls the particles of one particle system toward it.
///
/// The attractor owns its configuration, its world transform and the
/// "attracted" handlers. It caches which UI container (if any) remaps
/// its target system; the cache is refreshed whenever the target is
/// reassigned or the attractor is enabled.
pub struct Attractor {
    config: AttractorConfig,
    pub transform: Transform,
    particle_system: Option<ParticleSystemId>,
    container: Option<ContainerId>,
    enabled: bool,
    handlers: Vec<(HandlerId, AttractedHandler)>,
    next_handler: HandlerId,
}

impl std::fmt::Debug for Attractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attractor")
            .field("config", &self.config)
            .field("transform", &self.transform)
            .field("particle_system", &self.particle_system)
            .field("container", &self.container)
            .field("enabled", &self.enabled)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Attractor {
    /// Creates a disabled attractor with no target system.
    pub fn new(config: AttractorConfig, transform: Transform) -> Self {
        Self {
            config,
            transform,
            particle_system: None,
            container: None,
            enabled: false,
            handlers: Vec::new(),
            next_handler: 0,
        }
    }

    pub fn config(&self) -> &AttractorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AttractorConfig {
        &mut self.config
    }

    pub fn particle_system(&self) -> Option<ParticleSystemId> {
        self.particle_system
    }

    /// Container currently remapping the target system.
    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Retargets the attractor and enables it on success.
    ///
    /// ### Errors
    /// [`AttractorError::MissingParticleSystem`] for `None`, or
    /// [`AttractorError::UnknownParticleSystem`] if the host has no such
    /// system. The attractor is disabled in both cases.
    pub fn set_particle_system<H: ParticleHost + ?Sized>(
        &mut self,
        host: &H,
        system: Option<ParticleSystemId>,
    ) -> Result<(), AttractorError> {
        self.particle_system = system;
        self.enable(host)
    }

    /// Resolves the target system and starts receiving ticks.
    ///
    /// ### Errors
    /// Same as [`Attractor::set_particle_system`].
    pub fn enable<H: ParticleHost + ?Sized>(&mut self, host: &H) -> Result<(), AttractorError> {
        self.apply_particle_system(host)?;
        self.enabled = true;
        Ok(())
    }

    /// Stops receiving ticks and forgets the cached container.
    pub fn disable(&mut self) {
        self.container = None;
        self.enabled = false;
    }

    fn apply_particle_system<H: ParticleHost + ?Sized>(
        &mut self,
        host: &H,
    ) -> Result<(), AttractorError> {
        let result = match self.particle_system {
            None => Err(AttractorError::MissingParticleSystem),
            Some(id) if host.system(id).is_none() => Err(AttractorError::UnknownParticleSystem(id)),
            Some(id) => Ok(id),
        };

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "attractor disabled");
                self.disable();
                return Err(e);
            }
        };

        self.container = remap::resolve_container(host, id);
        debug!(system = id, container = ?self.container, "attractor target applied");
        Ok(())
    }

    /// Remap snapshot for this tick, if the cached container is enabled.
    pub fn remap_context<H: ParticleHost + ?Sized>(&self, host: &H) -> Option<SpaceRemapContext> {
        let container = host.container(self.container?)?;
        if !container.enabled {
            return None;
        }
        Some(SpaceRemapContext::from_container(container, !host.is_playing()))
    }

    /// Runs one attraction tick on the target system's live particles.
    ///
    /// Does nothing when no system is assigned, the system is gone, or it
    /// has no live particles.
    ///
    /// ### Returns
    /// The particles captured this tick.
    pub fn attract<H: ParticleHost + ?Sized>(&self, host: &mut H) -> Vec<Attracted> {
        let Some(id) = self.particle_system else {
            return Vec::new();
        };
        let remap = self.remap_context(&*host);

        let Some(ParticleSystem {
            transform,
            simulation_space,
            particles,
            ..
        }) = host.system_mut(id)
        else {
            return Vec::new();
        };
        if particles.is_empty() {
            return Vec::new();
        }

        attraction::update_in_space(
            particles.live_mut(),
            &self.config,
            self.transform.position,
            transform,
            *simulation_space,
            remap.as_ref(),
        )
    }

    /// Subscribes a handler to "attracted" signals.
    pub fn on_attracted(
        &mut self,
        handler: impl FnMut() -> Result<(), HandlerError> + 'static,
    ) -> HandlerId {
        let id = self.next_handler;
        self.next_handler += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Unsubscribes a handler. Returns `false` if `id` was not subscribed.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Invokes every handler once per event.
    ///
    /// A handler that returns an error or panics is logged and skipped;
    /// the remaining handlers and events still run.
    ///
    /// ### Returns
    /// The number of failed handler invocations.
    pub fn dispatch(&mut self, events: &[Attracted]) -> usize {
        let mut failures = 0;
        for event in events {
            for (id, handler) in &mut self.handlers {
                match panic::catch_unwind(AssertUnwindSafe(|| handler())) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(
                            handler = *id,
                            particle = event.index,
                            error = %e,
                            "attracted handler failed"
                        );
                        failures += 1;
                    }
                    Err(payload) => {
                        error!(
                            handler = *id,
                            particle = event.index,
                            panic = panic_message(&*payload),
                            "attracted handler panicked"
                        );
                        failures += 1;
                    }
                }
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        host::{Stage, UiContainer},
        particle::Particle,
        remap::SimulationSpace,
    };
    use glam::Vec3;
    use std::{cell::Cell, rc::Rc};

    fn stage() -> (Stage, ParticleSystemId) {
        let mut stage = Stage::default();
        let id = stage.add_system(ParticleSystem::new(
            Transform::IDENTITY,
            SimulationSpace::World,
            16,
        ));
        (stage, id)
    }

    #[test]
    fn missing_system_disables_with_error() {
        let (stage, sys) = stage();
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);

        a.set_particle_system(&stage, Some(sys)).unwrap();
        assert!(a.is_enabled());

        let err = a.set_particle_system(&stage, None).unwrap_err();
        assert_eq!(err, AttractorError::MissingParticleSystem);
        assert!(!a.is_enabled());

        // Recoverable by assigning a valid target again.
        a.set_particle_system(&stage, Some(sys)).unwrap();
        assert!(a.is_enabled());
    }

    #[test]
    fn unknown_system_is_a_configuration_error() {
        let (stage, _) = stage();
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);

        let err = a.set_particle_system(&stage, Some(9)).unwrap_err();
        assert_eq!(err, AttractorError::UnknownParticleSystem(9));
        assert!(!a.is_enabled());
    }

    #[test]
    fn enable_without_system_fails() {
        let (stage, _) = stage();
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        assert_eq!(a.enable(&stage), Err(AttractorError::MissingParticleSystem));
        assert!(!a.is_enabled());
    }

    #[test]
    fn container_is_cached_only_when_it_manages_the_system() {
        let (mut stage, sys) = stage();
        let c = stage.add_container(UiContainer::new(Transform::IDENTITY, Vec3::ONE));
        stage.set_ui_parent(sys, Some(c));

        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        a.set_particle_system(&stage, Some(sys)).unwrap();
        assert_eq!(a.container(), None);

        stage.attach(sys, c);
        // Not re-resolved until the target is reassigned.
        assert_eq!(a.container(), None);
        a.set_particle_system(&stage, Some(sys)).unwrap();
        assert_eq!(a.container(), Some(c));

        a.disable();
        assert_eq!(a.container(), None);
    }

    #[test]
    fn disabled_container_yields_no_remap() {
        let (mut stage, sys) = stage();
        let c = stage.add_container(UiContainer::new(Transform::IDENTITY, Vec3::splat(2.0)));
        stage.attach(sys, c);

        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        a.set_particle_system(&stage, Some(sys)).unwrap();
        assert!(a.remap_context(&stage).is_some());

        stage.containers[c].enabled = false;
        assert!(a.remap_context(&stage).is_none());
    }

    #[test]
    fn remap_context_reports_edit_preview() {
        let (mut stage, sys) = stage();
        let c = stage.add_container(UiContainer::new(Transform::IDENTITY, Vec3::ONE));
        stage.attach(sys, c);
        stage.playing = false;

        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        a.set_particle_system(&stage, Some(sys)).unwrap();

        let ctx = a.remap_context(&stage).unwrap();
        assert!(ctx.edit_preview);
    }

    #[test]
    fn attract_captures_particles_in_host_buffer() {
        let (mut stage, sys) = stage();
        stage.systems[sys]
            .particles
            .emit(Particle::new(Vec3::new(0.2, 0.0, 0.0), Vec3::ZERO, 5.0));
        stage.systems[sys]
            .particles
            .emit(Particle::new(Vec3::new(30.0, 0.0, 0.0), Vec3::ZERO, 5.0));

        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        a.set_particle_system(&stage, Some(sys)).unwrap();

        let events = a.attract(&mut stage);

        assert_eq!(events, vec![Attracted { index: 0 }]);
        let live = stage.systems[sys].particles.live();
        assert_eq!(live[0].remaining_lifetime, 0.0);
        assert!(live[1].is_alive());
    }

    #[test]
    fn attract_on_empty_buffer_is_a_noop() {
        let (mut stage, sys) = stage();
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        a.set_particle_system(&stage, Some(sys)).unwrap();

        assert!(a.attract(&mut stage).is_empty());
    }

    #[test]
    fn failing_handler_does_not_stop_dispatch() {
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        let calls = Rc::new(Cell::new(0));

        a.on_attracted(|| Err(HandlerError::new("boom")));
        let counter = Rc::clone(&calls);
        a.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let events = [Attracted { index: 0 }, Attracted { index: 3 }];
        let failures = a.dispatch(&events);

        assert_eq!(failures, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn panicking_handler_is_counted_and_isolated() {
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        let calls = Rc::new(Cell::new(0));

        a.on_attracted(|| panic!("handler blew up"));
        let counter = Rc::clone(&calls);
        a.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let failures = a.dispatch(&[Attracted { index: 0 }, Attracted { index: 1 }]);

        assert_eq!(failures, 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u32), "non-string panic payload");
    }

    #[test]
    fn removed_handler_is_not_invoked() {
        let mut a = Attractor::new(AttractorConfig::default(), Transform::IDENTITY);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = a.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });

        assert!(a.remove_handler(id));
        assert!(!a.remove_handler(id));
        assert_eq!(a.handler_count(), 0);

        a.dispatch(&[Attracted { index: 0 }]);
        assert_eq!(calls.get(), 0);
    }
}
