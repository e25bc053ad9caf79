//! GlanceTemp overlay window
//!
//! A borderless, transparent, always-on-top viewport that ignores the mouse and
//! stays out of the taskbar. The only thing drawn on it is the scene: two glow
//! strips on the screen edges, or a grey half with a message when a sensor is
//! unavailable.

use eframe::egui;

mod app;
mod paint;

pub use app::OverlayApp;
pub use paint::{paint_scene, to_color32};

use crate::config::Config;
use crate::error::Result;

/// Initial size used until the monitor size is known
const FALLBACK_SIZE: [f32; 2] = [1920.0, 1080.0];

/// Run the overlay until the window is closed
pub fn run(config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("GlanceTemp")
            .with_app_id("glancetemp")
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_mouse_passthrough(true)
            .with_taskbar(false)
            .with_resizable(false)
            .with_position([0.0, 0.0])
            .with_inner_size(FALLBACK_SIZE),
        ..Default::default()
    };

    log::info!("Starting overlay");
    eframe::run_native(
        "GlanceTemp",
        options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, config)))),
    )?;
    Ok(())
}
