// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2024 NervoSys

//! NVIDIA GPU temperature via NVML
//!
//! NVML is opened once. If that fails, or the configured device does not exist,
//! the sensor settles into a permanent unavailable status and never touches
//! NVML again. [`NvmlGpuSensor::close`] shuts the library down; dropping the
//! sensor closes it and logs any shutdown failure.

use super::{GpuSensor, GpuStatus};
use crate::config::GpuConfig;
use crate::error::{GlanceError, Result};

#[cfg(feature = "nvidia")]
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
#[cfg(feature = "nvidia")]
use nvml_wrapper::error::NvmlError;
#[cfg(feature = "nvidia")]
use nvml_wrapper::Nvml;

/// GPU temperature sensor for one NVML device
pub struct NvmlGpuSensor {
    status: GpuStatus,
    #[cfg(feature = "nvidia")]
    index: u32,
    #[cfg(feature = "nvidia")]
    nvml: Option<Nvml>,
}

impl NvmlGpuSensor {
    /// Open NVML and resolve the configured device
    pub fn open(config: &GpuConfig) -> Self {
        if !config.enabled {
            log::info!("GPU monitoring disabled by configuration");
            return Self::unavailable(GpuStatus::Disabled);
        }
        Self::open_nvml(config.device_index)
    }

    /// A sensor that reports `status` and never reads
    pub fn unavailable(status: GpuStatus) -> Self {
        Self {
            status,
            #[cfg(feature = "nvidia")]
            index: 0,
            #[cfg(feature = "nvidia")]
            nvml: None,
        }
    }

    #[cfg(feature = "nvidia")]
    fn open_nvml(index: u32) -> Self {
        let nvml = match Nvml::init() {
            Ok(nvml) => nvml,
            Err(e) => {
                let status = classify_init_error(&e);
                log::warn!("NVML initialization failed: {} ({:?})", e, status);
                return Self::unavailable(status);
            }
        };

        let device_count = match nvml.device_count() {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Failed to get NVIDIA device count: {}", e);
                return Self::unavailable(GpuStatus::InitError {
                    kind: error_kind(&e),
                });
            }
        };

        if device_count == 0 {
            log::warn!("NVML reports no NVIDIA devices");
            return Self::unavailable(GpuStatus::NoDevice);
        }
        if index >= device_count {
            log::warn!(
                "NVIDIA device {} requested but only {} present",
                index,
                device_count
            );
            return Self::unavailable(GpuStatus::NoDevice);
        }

        let name = match nvml.device_by_index(index) {
            Ok(device) => device
                .name()
                .unwrap_or_else(|_| format!("NVIDIA GPU {}", index)),
            Err(e) => {
                log::warn!("Failed to get NVIDIA device {}: {}", index, e);
                return Self::unavailable(GpuStatus::InitError {
                    kind: error_kind(&e),
                });
            }
        };

        log::info!("Monitoring GPU {}: {}", index, name);
        Self {
            status: GpuStatus::Available { name },
            index,
            nvml: Some(nvml),
        }
    }

    #[cfg(not(feature = "nvidia"))]
    fn open_nvml(_index: u32) -> Self {
        log::warn!("NVIDIA support not compiled in");
        Self::unavailable(GpuStatus::BindingMissing)
    }

    /// Shut NVML down, reporting any failure
    ///
    /// Later calls, and calls on an unavailable sensor, are no-ops.
    #[cfg(feature = "nvidia")]
    pub fn close(&mut self) -> Result<()> {
        if let Some(nvml) = self.nvml.take() {
            log::debug!("Shutting down NVML");
            nvml.shutdown()?;
        }
        Ok(())
    }

    #[cfg(not(feature = "nvidia"))]
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl GpuSensor for NvmlGpuSensor {
    fn status(&self) -> &GpuStatus {
        &self.status
    }

    #[cfg(feature = "nvidia")]
    fn temperature(&mut self) -> Result<u32> {
        let nvml = self.nvml.as_ref().ok_or_else(|| {
            GlanceError::Unsupported(format!("GPU unavailable: {:?}", self.status))
        })?;
        let device = nvml.device_by_index(self.index)?;
        Ok(device.temperature(TemperatureSensor::Gpu)?)
    }

    #[cfg(not(feature = "nvidia"))]
    fn temperature(&mut self) -> Result<u32> {
        Err(GlanceError::Unsupported(
            "NVIDIA support not compiled in".to_string(),
        ))
    }
}

impl Drop for NvmlGpuSensor {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("NVML shutdown failed: {}", e);
        }
    }
}

/// Map an `Nvml::init` failure onto a permanent status
#[cfg(feature = "nvidia")]
fn classify_init_error(err: &NvmlError) -> GpuStatus {
    match err {
        NvmlError::LibloadingError(_)
        | NvmlError::FailedToLoadSymbol(_)
        | NvmlError::LibraryNotFound
        | NvmlError::DriverNotLoaded => GpuStatus::BindingMissing,
        NvmlError::NotFound => GpuStatus::NoDevice,
        other => GpuStatus::InitError {
            kind: error_kind(other),
        },
    }
}

/// Variant name of an NVML error, e.g. `NoPermission`
#[cfg(feature = "nvidia")]
fn error_kind(err: &NvmlError) -> String {
    let debug = format!("{:?}", err);
    debug
        .split(|c: char| c == '(' || c == ' ' || c == '{')
        .next()
        .unwrap_or("Unknown")
        .to_string()
}
