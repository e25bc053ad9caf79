//! Headless sampling
//!
//! Drives the same [`Overlay`] the window uses and prints what each strip would
//! show, without opening a window. Useful for checking sensors on a machine
//! before running the overlay.

use std::io::Write;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{GlanceError, Result};
use crate::overlay::{Overlay, Side, StripState};
use crate::sensors::{CpuSensor, GpuSensor, GpuStatus};

/// Output format for probe samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFormat {
    Text,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for ProbeFormat {
    type Err = GlanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ProbeFormat::Text),
            "json" => Ok(ProbeFormat::Json),
            other => Err(GlanceError::Parse(format!(
                "unknown format '{}', expected text or json",
                other
            ))),
        }
    }
}

/// One line of probe output
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSample {
    pub index: u32,
    pub cpu_usage: f32,
    pub gpu_temp: Option<f32>,
    pub gpu_status: GpuStatus,
    pub gpu_strip: StripState,
    pub cpu_strip: StripState,
}

impl ProbeSample {
    pub fn capture<C: CpuSensor, G: GpuSensor>(index: u32, overlay: &Overlay<C, G>) -> Self {
        let gpu_strip = overlay.strip(Side::Left);
        let gpu_temp = match (&gpu_strip, overlay.gpu_status().is_available()) {
            (StripState::Glow { .. }, true) => Some(overlay.gpu_temp()),
            _ => None,
        };
        Self {
            index,
            cpu_usage: overlay.cpu_usage(),
            gpu_temp,
            gpu_status: overlay.gpu_status().clone(),
            gpu_strip,
            cpu_strip: overlay.strip(Side::Right),
        }
    }

    pub fn to_text(&self) -> String {
        let gpu = match (&self.gpu_temp, &self.gpu_strip) {
            (Some(temp), StripState::Glow { color, .. }) => {
                format!("{:>5.1}°C {}", temp, color.to_hex())
            }
            (_, StripState::Message { text }) => text.clone(),
            _ => "n/a".to_string(),
        };
        let cpu = match &self.cpu_strip {
            StripState::Glow { color, .. } => {
                format!("{:>5.1}% {}", self.cpu_usage, color.to_hex())
            }
            StripState::Message { text } => text.clone(),
        };
        format!("[{:>3}] GPU: {:<28} CPU: {}", self.index, gpu, cpu)
    }
}

/// Sample `count` times, `interval` apart, writing each sample to `out`
///
/// The first sample primes delta-based CPU sensors and is not printed.
pub fn run<C, G, W>(
    overlay: &mut Overlay<C, G>,
    count: u32,
    interval: Duration,
    format: ProbeFormat,
    out: &mut W,
) -> Result<()>
where
    C: CpuSensor,
    G: GpuSensor,
    W: Write,
{
    overlay.sample(Instant::now());

    for index in 1..=count {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
        overlay.sample(Instant::now());
        let sample = ProbeSample::capture(index, overlay);
        match format {
            ProbeFormat::Text => writeln!(out, "{}", sample.to_text())?,
            ProbeFormat::Json => {
                let line = serde_json::to_string(&sample)
                    .map_err(|e| GlanceError::Parse(format!("Failed to encode sample: {}", e)))?;
                writeln!(out, "{}", line)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sensors::NvmlGpuSensor;

    struct FixedCpu(f32);

    impl CpuSensor for FixedCpu {
        fn sample(&mut self) -> Result<Option<f32>> {
            Ok(Some(self.0))
        }
    }

    struct FixedGpu {
        status: GpuStatus,
        temp: u32,
    }

    impl GpuSensor for FixedGpu {
        fn status(&self) -> &GpuStatus {
            &self.status
        }

        fn temperature(&mut self) -> Result<u32> {
            Ok(self.temp)
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("text".parse::<ProbeFormat>().unwrap(), ProbeFormat::Text);
        assert_eq!("JSON".parse::<ProbeFormat>().unwrap(), ProbeFormat::Json);
        assert!("yaml".parse::<ProbeFormat>().is_err());
    }

    #[test]
    fn test_text_probe() {
        let gpu = FixedGpu {
            status: GpuStatus::Available {
                name: "Test GPU".to_string(),
            },
            temp: 50,
        };
        let mut overlay = Overlay::new(&Config::default(), FixedCpu(0.0), gpu);
        let mut out = Vec::new();
        run(&mut overlay, 2, Duration::ZERO, ProbeFormat::Text, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[  1] GPU:  50.0°C #ff0000e6"));
        assert!(lines[1].contains("CPU:   0.0% #00ff0096"));
    }

    #[test]
    fn test_json_probe_without_gpu() {
        let mut overlay = Overlay::new(
            &Config::default(),
            FixedCpu(12.5),
            NvmlGpuSensor::unavailable(GpuStatus::NoDevice),
        );
        let mut out = Vec::new();
        run(&mut overlay, 1, Duration::ZERO, ProbeFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["index"], 1);
        assert_eq!(value["cpu_usage"], 12.5);
        assert!(value["gpu_temp"].is_null());
        assert_eq!(value["gpu_status"]["state"], "no_device");
        assert_eq!(value["gpu_strip"]["kind"], "message");
        assert_eq!(value["gpu_strip"]["text"], "No NVIDIA GPU Found");
        assert_eq!(value["cpu_strip"]["kind"], "glow");
    }
}
