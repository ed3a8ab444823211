//! Interactive particle attractor viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Stage`] with one
//! particle system and one UI container, an [`Emitter`], and an
//! [`Updater`] driving a single attractor. It implements [`eframe::App`]
//! to render the particles and edit the attractor settings.

use attract_core::{
    attractor::Attractor,
    config::{
        AttractorConfig, DELAY_RATE_RANGE, DESTINATION_RADIUS_RANGE, MAX_SPEED_RANGE, Movement,
    },
    emitter::{self, Emitter},
    host::{ParticleSystem, Stage, UiContainer},
    remap::{self, SimulationSpace},
    transform::Transform,
    types::{AttractorId, ContainerId, ParticleSystemId},
    updater::{TickReport, Updater},
};
use eframe::App;
use glam::Vec3;
use rand::rng;
use std::{cell::Cell, rc::Rc};
use tracing::{info, warn};

const PARTICLE_CAPACITY: usize = 4096;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the emitter, the attractor and the live particles.
///
/// ### Fields
/// - `stage` - Host owning the particle system and the UI container.
/// - `system` / `container` - Ids of those two objects in `stage`.
/// - `updater` - Registry ticking the attractor.
/// - `attractor` - Id of the attractor in `updater`.
/// - `emitter` - Continuous particle source for `system`.
/// - `captured` - Total "attracted" signals seen by the counting handler.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` / `pan` - World-to-screen mapping.
///
/// - `step_interval` - Simulated seconds per step.
/// - `last_step_time` / `last_step_dt` - Timing of the last auto step.
/// - `last_report` - Result of the last [`Updater::tick`].
pub struct Viewer {
    stage: Stage,
    system: ParticleSystemId,
    container: ContainerId,
    updater: Updater,
    attractor: AttractorId,
    emitter: Emitter,
    captured: Rc<Cell<u64>>,

    rng: rand::rngs::ThreadRng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
    last_report: TickReport,
}

impl Viewer {
    /// Creates a viewer with an emitter at the origin and the attractor
    /// at `(80, 60)`. The UI container exists but does not manage the
    /// particle system until enabled from the side panel.
    pub fn new() -> Self {
        let mut stage = Stage::default();
        let system = stage.add_system(ParticleSystem::new(
            Transform::IDENTITY,
            SimulationSpace::World,
            PARTICLE_CAPACITY,
        ));
        let container = stage.add_container(UiContainer::new(
            Transform::from_position(Vec3::new(-40.0, -20.0, 0.0)),
            Vec3::splat(2.0),
        ));

        let captured = Rc::new(Cell::new(0));
        let attractor = Self::build_attractor(&stage, system, &captured);

        let mut updater = Updater::new();
        let attractor = updater.register(attractor);

        Self {
            stage,
            system,
            container,
            updater,
            attractor,
            emitter: Emitter::default(),
            captured,
            rng: rng(),
            running: false,
            zoom: 3.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
            last_report: TickReport::default(),
        }
    }

    fn build_attractor(
        stage: &Stage,
        system: ParticleSystemId,
        captured: &Rc<Cell<u64>>,
    ) -> Attractor {
        let mut attractor = Attractor::new(
            AttractorConfig::default().with_destination_radius(3.0).with_max_speed(4.0),
            Transform::from_position(Vec3::new(80.0, 60.0, 0.0)),
        );
        if let Err(e) = attractor.set_particle_system(stage, Some(system)) {
            warn!(error = %e, "viewer attractor has no target");
        }

        let counter = Rc::clone(captured);
        attractor.on_attracted(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        attractor
    }

    fn attractor(&self) -> Option<&Attractor> {
        self.updater.get(self.attractor)
    }

    fn attractor_mut(&mut self) -> Option<&mut Attractor> {
        self.updater.get_mut(self.attractor)
    }

    /// Re-resolves the attractor's container after the hierarchy changed.
    fn retarget(&mut self) {
        let system = self.system;
        let Some(attractor) = self.updater.get_mut(self.attractor) else {
            return;
        };
        if let Err(e) = attractor.set_particle_system(&self.stage, Some(system)) {
            warn!(error = %e, "failed to retarget attractor");
        }
    }

    /// Drops all particles and the capture count, and stops auto-running.
    /// Configuration and camera are kept.
    fn reset(&mut self) {
        self.clear();
        self.captured.set(0);
        self.last_report = TickReport::default();
        self.running = false;
    }

    /// Removes every live particle.
    fn clear(&mut self) {
        self.stage.systems[self.system].particles.clear();
    }

    /// Advances the simulation by a single step of `step_interval` seconds.
    ///
    /// The step consists of:
    /// 1. Emitting the particles due for this step.
    /// 2. Integrating velocities and lifetimes, dropping dead particles.
    /// 3. Ticking the updater, which attracts and dispatches signals.
    fn step_once(&mut self) {
        let dt = self.step_interval as f32;
        let system = &mut self.stage.systems[self.system];
        self.emitter.update(system, dt, &mut self.rng);
        emitter::integrate(&mut system.particles, dt);

        self.last_report = self.updater.tick(&mut self.stage);
    }

    /// Maps a simulation-space particle position back to world space,
    /// undoing the canvas remap when it is active.
    fn sim_to_world(&self, p: Vec3) -> Vec3 {
        let system = &self.stage.systems[self.system];
        let space = system.simulation_space;

        let local = match self.attractor().and_then(|a| a.remap_context(&self.stage)) {
            Some(ctx) => {
                // The remap is affine: sim = local * scale + offset, where
                // offset is what the system's own origin maps to.
                let origin = match space {
                    SimulationSpace::Local => system.transform.position,
                    SimulationSpace::World => Vec3::ZERO,
                };
                let offset =
                    remap::destination_position(origin, &system.transform, space, Some(&ctx));
                let scale = ctx.container_local_scale * ctx.inverse_canvas_scale();
                (p - offset) / scale
            }
            None => p,
        };

        match space {
            SimulationSpace::Local => system.transform.transform_point(local),
            SimulationSpace::World => local,
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World x/y are scaled by `zoom`, offset by `pan`, and centered
    /// inside `rect`. The y-axis is flipped so that positive y goes up.
    fn world_to_screen(&self, p: Vec3, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space on the z = 0 plane.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec3 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec3::new(x, y, 0.0)
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt = ")
                        .range(0.001..=0.25)
                        .speed(0.001),
                );

                if ui.button("Step").clicked() {
                    self.step_once();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, particle counts, captures).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!(
                    "particles = {}",
                    self.stage.systems[self.system].particles.live_count()
                ));
                ui.label(format!("captured = {}", self.captured.get()));
                ui.label(format!(
                    "last tick: attracted {} / failures {}",
                    self.last_report.attracted, self.last_report.handler_failures
                ));
            });
        });
    }

    /// Builds the right-hand panel for attractor, emitter and canvas settings.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Attractor");
                self.ui_attractor_settings(ui);

                ui.separator();
                ui.heading("Emitter");
                ui.add(egui::Slider::new(&mut self.emitter.rate, 0.0..=500.0).text("rate"));
                self.ui_simulation_space(ui);

                ui.separator();
                ui.heading("UI container");
                self.ui_container_settings(ui);
            });
    }

    fn ui_attractor_settings(&mut self, ui: &mut egui::Ui) {
        let Some(attractor) = self.attractor_mut() else {
            ui.label("attractor unregistered");
            return;
        };
        let cfg = attractor.config_mut();

        let mut radius = cfg.destination_radius();
        if ui
            .add(
                egui::Slider::new(&mut radius, DESTINATION_RADIUS_RANGE)
                    .text("destination radius"),
            )
            .changed()
        {
            cfg.set_destination_radius(radius);
        }

        let mut delay = cfg.delay_rate();
        if ui
            .add(egui::Slider::new(&mut delay, DELAY_RATE_RANGE).text("delay rate"))
            .changed()
        {
            cfg.set_delay_rate(delay);
        }

        let mut speed = cfg.max_speed();
        if ui
            .add(
                egui::Slider::new(&mut speed, MAX_SPEED_RANGE)
                    .logarithmic(true)
                    .text("max speed"),
            )
            .changed()
        {
            cfg.set_max_speed(speed);
        }

        let mut movement = cfg.movement();
        egui::ComboBox::from_label("movement")
            .selected_text(movement.label())
            .show_ui(ui, |ui| {
                for m in Movement::ALL {
                    ui.selectable_value(&mut movement, m, m.label());
                }
            });
        cfg.set_movement(movement);

        if ui.button("Reset cfg to default").clicked() {
            *cfg = AttractorConfig::default();
        }
    }

    fn ui_simulation_space(&mut self, ui: &mut egui::Ui) {
        let system = &mut self.stage.systems[self.system];
        let before = system.simulation_space;
        ui.horizontal(|ui| {
            ui.radio_value(&mut system.simulation_space, SimulationSpace::Local, "Local");
            ui.radio_value(&mut system.simulation_space, SimulationSpace::World, "World");
        });
        if system.simulation_space != before {
            // Existing positions are expressed in the old space.
            system.particles.clear();
        }
    }

    fn ui_container_settings(&mut self, ui: &mut egui::Ui) {
        let mut attached = self.stage.containers[self.container].manages(self.system);
        if ui.checkbox(&mut attached, "manage particle system").changed() {
            if attached {
                self.stage.attach(self.system, self.container);
            } else {
                self.stage.detach(self.system);
            }
            self.retarget();
            info!(attached, "UI container membership changed");
        }

        let container = &mut self.stage.containers[self.container];
        ui.checkbox(&mut container.enabled, "enabled");
        ui.checkbox(&mut container.absolute_mode, "absolute mode");

        let mut canvas = container.canvas_scale.x;
        if ui
            .add(egui::Slider::new(&mut canvas, 0.25..=4.0).text("canvas scale"))
            .changed()
        {
            container.canvas_scale = Vec3::splat(canvas);
        }

        let mut local = container.transform.scale.x;
        if ui
            .add(egui::Slider::new(&mut local, 0.25..=4.0).text("local scale"))
            .changed()
        {
            container.transform.scale = Vec3::splat(local);
        }

        let mut preview = !self.stage.playing;
        if ui.checkbox(&mut preview, "edit preview").changed() {
            self.stage.playing = !preview;
        }
    }

    /// Builds the central panel where the scene is drawn and interacted with.
    ///
    /// Dragging pans the view, clicking moves the attractor, scrolling zooms.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            if response.clicked()
                && let Some(p) = response.hover_pos()
            {
                let world = self.screen_to_world(p, rect);
                if let Some(attractor) = self.attractor_mut() {
                    attractor.transform.position = world;
                }
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // UI container origin.
            let container = &self.stage.containers[self.container];
            if container.manages(self.system) {
                let p = self.world_to_screen(container.transform.position, rect);
                let color = if container.enabled {
                    egui::Color32::LIGHT_YELLOW
                } else {
                    egui::Color32::DARK_GRAY
                };
                painter.rect_stroke(
                    egui::Rect::from_center_size(p, egui::vec2(10.0, 10.0)),
                    0.0,
                    egui::Stroke::new(1.0, color),
                    egui::StrokeKind::Middle,
                );
            }

            // Emitter.
            let system = &self.stage.systems[self.system];
            let origin = self.world_to_screen(system.transform.position, rect);
            painter.circle_filled(origin, 4.0, egui::Color32::LIGHT_GREEN);

            // Attractor and its capture radius.
            if let Some(attractor) = self.attractor() {
                let p = self.world_to_screen(attractor.transform.position, rect);
                let r = attractor.config().destination_radius() * self.zoom;
                painter.circle_filled(p, 3.0, egui::Color32::RED);
                painter.circle_stroke(p, r, egui::Stroke::new(1.0, egui::Color32::RED));
            }

            // Live particles.
            for particle in system.particles.live() {
                let p = self.world_to_screen(self.sim_to_world(particle.position), rect);
                painter.circle_filled(p, 1.5, egui::Color32::LIGHT_BLUE);
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attract_core::{host::ParticleHost, particle::Particle};

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new();
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        for p in [Vec3::ZERO, Vec3::new(10.0, -5.0, 0.0), Vec3::new(-3.5, 8.25, 0.0)] {
            let back = viewer.screen_to_world(viewer.world_to_screen(p, rect), rect);
            assert!(approx(back, p), "p={p:?}, back={back:?}");
        }
    }

    #[test]
    fn sim_to_world_inverts_the_canvas_remap() {
        let mut viewer = Viewer::new();
        viewer.stage.attach(viewer.system, viewer.container);
        viewer.stage.systems[viewer.system].transform =
            Transform::from_position(Vec3::new(5.0, 3.0, 0.0));
        viewer.retarget();

        for space in [SimulationSpace::World, SimulationSpace::Local] {
            viewer.stage.systems[viewer.system].simulation_space = space;
            for absolute in [false, true] {
                viewer.stage.containers[viewer.container].absolute_mode = absolute;

                let attractor = viewer.attractor().unwrap();
                let target = attractor.transform.position;
                let ctx = attractor.remap_context(&viewer.stage).unwrap();
                let system = &viewer.stage.systems[viewer.system];
                let dst = remap::destination_position(target, &system.transform, space, Some(&ctx));

                let back = viewer.sim_to_world(dst);
                assert!(approx(back, target), "{space:?} absolute={absolute}: {back:?}");
            }
        }
    }

    #[test]
    fn step_once_emits_and_captures() {
        let mut viewer = Viewer::new();
        viewer.emitter.rate = 0.0;

        let attractor_pos = viewer.attractor().unwrap().transform.position;
        viewer.stage.systems[viewer.system]
            .particles
            .emit(Particle::new(attractor_pos, Vec3::ZERO, 5.0));

        viewer.step_once();

        assert_eq!(viewer.last_report.attracted, 1);
        assert_eq!(viewer.captured.get(), 1);
    }

    #[test]
    fn reset_clears_particles_and_counters() {
        let mut viewer = Viewer::new();
        viewer.emitter.rate = 600.0;
        viewer.running = true;
        viewer.step_once();
        assert!(viewer.stage.systems[viewer.system].particles.live_count() > 0);
        viewer.captured.set(7);

        viewer.reset();

        assert_eq!(viewer.stage.systems[viewer.system].particles.live_count(), 0);
        assert_eq!(viewer.captured.get(), 0);
        assert_eq!(viewer.last_report, TickReport::default());
        assert!(!viewer.running);
    }

    #[test]
    fn retarget_picks_up_container_membership() {
        let mut viewer = Viewer::new();
        assert_eq!(viewer.attractor().unwrap().container(), None);

        viewer.stage.attach(viewer.system, viewer.container);
        viewer.retarget();
        assert_eq!(viewer.attractor().unwrap().container(), Some(viewer.container));
        assert!(viewer.stage.find_managing_container(viewer.system).is_some());
    }
}
