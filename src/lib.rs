//! # GlanceTemp
//!
//! A click-through desktop overlay that shows CPU usage and GPU temperature as
//! two glowing bars on the screen edges. The GPU bar hugs the left edge, the
//! CPU bar the right edge. Each bar is colored along a green → yellow → red
//! gradient and "breathes" faster as load rises.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Instant;
//! use glancetemp::config::Config;
//! use glancetemp::overlay::{Overlay, Side};
//! use glancetemp::sensors::{NvmlGpuSensor, SystemCpuSensor};
//!
//! let config = Config::load().unwrap_or_default();
//! let mut overlay = Overlay::new(
//!     &config,
//!     SystemCpuSensor::detect(),
//!     NvmlGpuSensor::open(&config.gpu),
//! );
//!
//! overlay.tick(Instant::now());
//! println!("GPU strip: {:?}", overlay.strip(Side::Left));
//! println!("CPU strip: {:?}", overlay.strip(Side::Right));
//! ```
//!
//! ## Feature Flags
//!
//! - `nvidia` - GPU temperature via NVML (the library is loaded at runtime)
//! - `gui` - the overlay window (eframe/egui)
//! - `cli` - the `glancetemp` binary
//! - `full` - All features enabled
//!
//! Without `nvidia`, or without an NVIDIA driver, the GPU half of the screen
//! shows a message instead of a bar and CPU monitoring carries on.

pub mod breathing; // Pulse phase and glow intensity
pub mod config; // Configuration management with TOML persistence
pub mod error;
pub mod gradient; // Load to color mapping
pub mod overlay; // Sample / animate / expire state machine
pub mod probe; // Headless sampling
pub mod scene; // Drawing primitives for the two strips
pub mod sensors; // CPU and NVIDIA GPU sensors

#[cfg(feature = "gui")]
pub mod gui; // Overlay window

pub use breathing::BreathPhase;
pub use config::{Config, GeneralConfig, GpuConfig, StyleConfig};
pub use error::{GlanceError, Result};
pub use gradient::{load_color, normalize, Metric, Rgba};
pub use overlay::{Overlay, Side, StripState};
pub use scene::{Primitive, Scene};
pub use sensors::{CpuSensor, GpuSensor, GpuStatus, NvmlGpuSensor, SystemCpuSensor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
