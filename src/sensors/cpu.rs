//! CPU utilization sensors
//!
//! On Linux the aggregate `cpu` line of `/proc/stat` is sampled and the busy
//! share of the jiffies elapsed between two samples is reported. Elsewhere, or
//! when `/proc/stat` cannot be read, `sysinfo` provides the global usage.

use super::CpuSensor;
use crate::error::{GlanceError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PROC_STAT: &str = "/proc/stat";

/// Cumulative jiffies from the aggregate `cpu` line of `/proc/stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// All accounted time (user through steal)
    pub total: u64,
    /// Idle plus iowait
    pub idle: u64,
}

impl CpuTimes {
    /// Parse the aggregate line out of a `/proc/stat` document
    pub fn parse(proc_stat: &str) -> Result<Self> {
        let line = proc_stat
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| GlanceError::Parse("no aggregate cpu line in /proc/stat".to_string()))?;

        let times: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|field| {
                field
                    .parse::<u64>()
                    .map_err(|e| GlanceError::Parse(format!("bad /proc/stat field {:?}: {}", field, e)))
            })
            .collect::<Result<_>>()?;

        if times.len() < 4 {
            return Err(GlanceError::Parse(format!(
                "expected at least 4 cpu fields, got {}",
                times.len()
            )));
        }

        // guest and guest_nice are already counted in user and nice
        let total = times.iter().take(8).sum();
        let idle = times[3] + times.get(4).copied().unwrap_or(0);

        Ok(Self { total, idle })
    }

    /// Busy percentage over the interval since `earlier`
    ///
    /// `None` when no time has elapsed or the counters went backwards.
    pub fn usage_since(&self, earlier: &CpuTimes) -> Option<f32> {
        let total = self.total.checked_sub(earlier.total)?;
        let idle = self.idle.checked_sub(earlier.idle)?;
        if total == 0 {
            return None;
        }
        let busy = total.saturating_sub(idle);
        Some(((busy as f64 / total as f64) * 100.0).clamp(0.0, 100.0) as f32)
    }
}

/// Delta sampler over `/proc/stat`
pub struct ProcStatCpuSensor {
    path: PathBuf,
    previous: Option<CpuTimes>,
}

impl ProcStatCpuSensor {
    pub fn new() -> Self {
        Self::with_path(PROC_STAT)
    }

    /// Read from an alternative stat file
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            previous: None,
        }
    }

    fn read_times(&self) -> Result<CpuTimes> {
        let contents = fs::read_to_string(&self.path)?;
        CpuTimes::parse(&contents)
    }
}

impl Default for ProcStatCpuSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSensor for ProcStatCpuSensor {
    fn sample(&mut self) -> Result<Option<f32>> {
        let current = self.read_times()?;
        let usage = match self.previous {
            Some(previous) => current.usage_since(&previous),
            None => None,
        };
        self.previous = Some(current);
        Ok(usage)
    }
}

/// Portable sampler backed by `sysinfo`
pub struct SysinfoCpuSensor {
    system: sysinfo::System,
}

impl SysinfoCpuSensor {
    pub fn new() -> Self {
        let mut system = sysinfo::System::new();
        // Baseline for the first delta
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl Default for SysinfoCpuSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSensor for SysinfoCpuSensor {
    fn sample(&mut self) -> Result<Option<f32>> {
        self.system.refresh_cpu_usage();
        let usage = self.system.global_cpu_usage();
        if !usage.is_finite() {
            return Err(GlanceError::Sensor(format!("invalid CPU usage {}", usage)));
        }
        Ok(Some(usage.clamp(0.0, 100.0)))
    }
}

/// The CPU sensor best suited to this platform
pub enum SystemCpuSensor {
    ProcStat(ProcStatCpuSensor),
    Sysinfo(SysinfoCpuSensor),
}

impl SystemCpuSensor {
    pub fn detect() -> Self {
        if cfg!(target_os = "linux") {
            let proc_stat = ProcStatCpuSensor::new();
            match proc_stat.read_times() {
                Ok(_) => {
                    log::debug!("CPU usage from {}", PROC_STAT);
                    return SystemCpuSensor::ProcStat(proc_stat);
                }
                Err(e) => log::warn!("{} unreadable ({}), falling back to sysinfo", PROC_STAT, e),
            }
        }
        log::debug!("CPU usage from sysinfo");
        SystemCpuSensor::Sysinfo(SysinfoCpuSensor::new())
    }
}

impl CpuSensor for SystemCpuSensor {
    fn sample(&mut self) -> Result<Option<f32>> {
        match self {
            SystemCpuSensor::ProcStat(sensor) => sensor.sample(),
            SystemCpuSensor::Sysinfo(sensor) => sensor.sample(),
        }
    }
}
