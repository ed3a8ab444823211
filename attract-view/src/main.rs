//! Application entry point for the particle attractor viewer.
//!
//! This binary installs the tracing subscriber, sets up eframe/egui and
//! delegates all interactive logic and rendering to [`Viewer`].

mod viewer;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Log output is filtered through `RUST_LOG`, defaulting to `info`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "UI Particle Attractor",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
