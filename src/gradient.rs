//! Load-to-color mapping
//!
//! Readings are normalized onto `[0, 1]` and mapped onto a green → yellow → red
//! gradient with the yellow stop at 30% of the range.

use serde::{Deserialize, Serialize};

/// Position of the yellow stop on the normalized scale
pub const YELLOW_STOP: f32 = 0.3;

/// Alpha of a bar at zero load
const BASE_ALPHA: f32 = 150.0;
/// Extra alpha gained at full load
const ALPHA_RANGE: f32 = 80.0;

/// An 8-bit RGBA color, independent of any rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbbaa`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Fill used for a strip that has nothing to show but a message
pub const UNAVAILABLE: Rgba = Rgba::new(100, 100, 100, 150);

/// Which reading a value belongs to, with the range it is mapped over
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// GPU temperature in °C, mapped over `[min, max]`
    GpuTemperature { min: f32, max: f32 },
    /// CPU utilization in percent, mapped over `[0, 100]`
    CpuUsage,
}

impl Metric {
    pub fn normalize(&self, value: f32) -> f32 {
        match *self {
            Metric::GpuTemperature { min, max } => normalize(value, min, max),
            Metric::CpuUsage => normalize(value, 0.0, 100.0),
        }
    }

    pub fn color(&self, value: f32) -> Rgba {
        load_color(self.normalize(value))
    }
}

/// Map `value` linearly from `[min, max]` onto `[0, 1]`, clamped
///
/// A degenerate range (`max <= min`) acts as a step at `max`.
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    if max <= min {
        return if value >= max { 1.0 } else { 0.0 };
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Color for a normalized load
pub fn load_color(normalized: f32) -> Rgba {
    let n = if normalized.is_nan() {
        0.0
    } else {
        normalized.clamp(0.0, 1.0)
    };

    let (r, g) = if n < YELLOW_STOP {
        // Green to yellow: red rises
        ((255.0 * (n / YELLOW_STOP)) as u8, 255)
    } else {
        // Yellow to red: green falls
        (
            255,
            (255.0 * (1.0 - (n - YELLOW_STOP) / (1.0 - YELLOW_STOP))) as u8,
        )
    };
    let a = (BASE_ALPHA + ALPHA_RANGE * n) as u8;

    Rgba::new(r, g, 0, a)
}
