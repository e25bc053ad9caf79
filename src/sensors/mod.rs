//! Sensor abstraction layer
//!
//! Two readings feed the overlay: aggregate CPU utilization and the temperature
//! of one NVIDIA GPU. Both sit behind small traits so the overlay can be driven
//! by fakes in tests.
//!
//! ```no_run
//! use glancetemp::config::Config;
//! use glancetemp::sensors::{CpuSensor, GpuSensor, NvmlGpuSensor, SystemCpuSensor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut cpu = SystemCpuSensor::detect();
//! let mut gpu = NvmlGpuSensor::open(&config.gpu);
//!
//! std::thread::sleep(config.general.update_interval());
//! println!("CPU: {:?}%", cpu.sample()?);
//! match gpu.status().message() {
//!     None => println!("GPU: {}°C", gpu.temperature()?),
//!     Some(message) => println!("GPU: {}", message),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cpu;
pub mod nvidia;

pub use cpu::{CpuTimes, ProcStatCpuSensor, SysinfoCpuSensor, SystemCpuSensor};
pub use nvidia::NvmlGpuSensor;

use crate::error::Result;
use serde::Serialize;

/// Source of aggregate CPU utilization
pub trait CpuSensor {
    /// Current utilization in percent
    ///
    /// Returns `Ok(None)` while the sensor is still collecting its baseline.
    fn sample(&mut self) -> Result<Option<f32>>;
}

/// Source of GPU temperature
pub trait GpuSensor {
    /// Availability decided when the sensor was opened
    fn status(&self) -> &GpuStatus;

    /// Current core temperature in °C
    fn temperature(&mut self) -> Result<u32>;
}

/// Whether GPU temperature can be read at all
///
/// Anything but `Available` is permanent for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GpuStatus {
    /// NVML is up and the device exists
    Available { name: String },
    /// NVML support not compiled in, or the NVML library could not be loaded
    BindingMissing,
    /// NVML loaded but reported no usable device
    NoDevice,
    /// NVML failed to initialize for another reason
    InitError { kind: String },
    /// GPU monitoring turned off in configuration
    Disabled,
}

impl GpuStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, GpuStatus::Available { .. })
    }

    /// Text shown in place of the GPU bar, if any
    pub fn message(&self) -> Option<String> {
        match self {
            GpuStatus::Available { .. } => None,
            GpuStatus::BindingMissing => Some("NVIDIA Driver/NVML Missing".to_string()),
            GpuStatus::NoDevice => Some("No NVIDIA GPU Found".to_string()),
            GpuStatus::InitError { kind } => Some(format!("GPU Init Error: {}", kind)),
            GpuStatus::Disabled => Some("GPU Monitoring Disabled".to_string()),
        }
    }
}
