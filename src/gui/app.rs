//! Overlay application state and frame loop

use std::time::Instant;

use eframe::egui;

use super::paint::paint_scene;
use crate::config::{Config, StyleConfig};
use crate::overlay::{Overlay, Side};
use crate::scene::Scene;
use crate::sensors::{NvmlGpuSensor, SystemCpuSensor};

pub struct OverlayApp {
    overlay: Overlay<SystemCpuSensor, NvmlGpuSensor>,
    style: StyleConfig,
    // Last composed scene, rebuilt when a timer fires or the screen changes
    scene: Option<Scene>,
    // Set once the viewport has been stretched over the monitor
    fitted_to_monitor: bool,
}

impl OverlayApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals {
            panel_fill: egui::Color32::TRANSPARENT,
            window_fill: egui::Color32::TRANSPARENT,
            ..egui::Visuals::dark()
        });

        let cpu = SystemCpuSensor::detect();
        let gpu = NvmlGpuSensor::open(&config.gpu);
        let overlay = Overlay::new(&config, cpu, gpu);

        Self {
            overlay,
            style: config.style,
            scene: None,
            fitted_to_monitor: false,
        }
    }

    fn fit_to_monitor(&mut self, ctx: &egui::Context) {
        if self.fitted_to_monitor {
            return;
        }
        if let Some(size) = ctx.input(|i| i.viewport().monitor_size) {
            log::debug!("Covering monitor of {}x{} points", size.x, size.y);
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(0.0, 0.0)));
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size));
            // Re-assert passthrough after the resize
            ctx.send_viewport_cmd(egui::ViewportCommand::MousePassthrough(true));
            self.fitted_to_monitor = true;
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.fit_to_monitor(ctx);

        let outcome = self.overlay.tick(Instant::now());

        let screen = ctx.screen_rect();
        let stale = match &self.scene {
            Some(scene) => {
                outcome.needs_repaint()
                    || scene.width != screen.width()
                    || scene.height != screen.height()
            }
            None => true,
        };
        if stale {
            self.scene = Some(Scene::compose(
                screen.width(),
                screen.height(),
                &self.style,
                &self.overlay.strip(Side::Left),
                &self.overlay.strip(Side::Right),
            ));
        }
        if let Some(scene) = &self.scene {
            let painter = ctx.layer_painter(egui::LayerId::background());
            paint_scene(&painter, scene);
        }

        ctx.request_repaint_after(self.overlay.next_deadline(Instant::now()));
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!(
            "Overlay closing (last reading: GPU {}°C, CPU {:.1}%)",
            self.overlay.gpu_temp(),
            self.overlay.cpu_usage()
        );
    }
}
