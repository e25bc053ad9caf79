//! Scene composition
//!
//! Turns the two strip states into flat drawing primitives for a surface of a
//! given size. The GPU strip owns the left edge and left half of the screen,
//! the CPU strip the right edge and right half.

use serde::Serialize;

use crate::config::StyleConfig;
use crate::gradient::{Rgba, UNAVAILABLE};
use crate::overlay::{Side, StripState};

/// Peak alpha of the innermost glow column, before color alpha and breathing
const GLOW_PEAK_ALPHA: f32 = 120.0;

/// Axis-aligned rectangle in physical-ish screen points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Primitive {
    FillRect { rect: Rect, color: Rgba },
    /// One pixel wide, full height column whose left edge is at `x`
    Column { x: f32, height: f32, color: Rgba },
    Text {
        center: (f32, f32),
        text: String,
        color: Rgba,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn compose(
        width: f32,
        height: f32,
        style: &StyleConfig,
        gpu: &StripState,
        cpu: &StripState,
    ) -> Self {
        let mut scene = Self {
            width: width.max(0.0),
            height: height.max(0.0),
            primitives: Vec::new(),
        };
        scene.push_strip(Side::Left, gpu, style);
        scene.push_strip(Side::Right, cpu, style);
        scene
    }

    fn half(&self, side: Side) -> Rect {
        let half_width = (self.width / 2.0).floor();
        let x = match side {
            Side::Left => 0.0,
            Side::Right => half_width,
        };
        Rect {
            x,
            y: 0.0,
            width: half_width,
            height: self.height,
        }
    }

    fn push_strip(&mut self, side: Side, state: &StripState, style: &StyleConfig) {
        match state {
            StripState::Message { text } => {
                let area = self.half(side);
                self.primitives.push(Primitive::FillRect {
                    rect: area,
                    color: UNAVAILABLE,
                });
                self.primitives.push(Primitive::Text {
                    center: area.center(),
                    text: text.clone(),
                    color: Rgba::WHITE,
                });
            }
            StripState::Glow { color, intensity } => {
                self.push_glow(side, *color, *intensity, style);
            }
        }
    }

    fn push_glow(&mut self, side: Side, color: Rgba, intensity: f32, style: &StyleConfig) {
        let bar_width = style.bar_width as f32;
        let bar_x = match side {
            Side::Left => 0.0,
            Side::Right => self.width - bar_width,
        };
        if bar_width > 0.0 {
            self.primitives.push(Primitive::FillRect {
                rect: Rect {
                    x: bar_x,
                    y: 0.0,
                    width: bar_width,
                    height: self.height,
                },
                color,
            });
        }

        // Glow stays inside the strip's own half
        let room = (self.half(side).width - bar_width).max(0.0) as u32;
        for i in 0..style.glow_width.min(room) {
            let alpha = glow_alpha(i, style.glow_width, color.a, intensity);
            if alpha == 0 {
                continue;
            }
            // Columns step inward from the bar
            let x = match side {
                Side::Left => bar_width + i as f32,
                Side::Right => self.width - bar_width - 1.0 - i as f32,
            };
            self.primitives.push(Primitive::Column {
                x,
                height: self.height,
                color: color.with_alpha(alpha),
            });
        }
    }
}

/// Alpha of glow column `i` (0 = next to the bar)
///
/// Fades linearly to zero across `glow_width`, scaled by the bar color's own
/// alpha and the breathing intensity.
pub fn glow_alpha(i: u32, glow_width: u32, color_alpha: u8, intensity: f32) -> u8 {
    if glow_width == 0 || i >= glow_width {
        return 0;
    }
    let falloff = 1.0 - i as f32 / glow_width as f32;
    let base = (GLOW_PEAK_ALPHA * falloff * (color_alpha as f32 / 255.0)) as u32;
    (base as f32 * intensity.clamp(0.0, 1.0)) as u8
}
