//! Overlay state: the sample / animate / expire cycle
//!
//! [`Overlay`] is everything the window needs between frames. It is driven by
//! [`Overlay::tick`] with an explicit `Instant`, so the GUI, the headless probe
//! and the tests all run the same code.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::breathing::BreathPhase;
use crate::config::Config;
use crate::gradient::{Metric, Rgba};
use crate::sensors::{CpuSensor, GpuSensor, GpuStatus};

/// Temperature shown before the first GPU read
pub const INITIAL_GPU_TEMP: f32 = 30.0;
/// CPU usage shown before the first read and after a failed one
pub const FALLBACK_CPU_USAGE: f32 = 10.0;

pub const GPU_READ_FAIL: &str = "GPU Read Fail!";
pub const CPU_READ_FAIL: &str = "CPU Read Fail!";

/// Screen edge a strip is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// GPU temperature
    Left,
    /// CPU usage
    Right,
}

/// What one strip should display right now
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StripState {
    Glow { color: Rgba, intensity: f32 },
    Message { text: String },
}

/// Outcome of one [`Overlay::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub sampled: bool,
    pub animated: bool,
    pub expired: bool,
}

impl TickOutcome {
    pub fn needs_repaint(&self) -> bool {
        self.sampled || self.animated || self.expired
    }
}

/// Timing knobs, pulled out of [`Config`]
#[derive(Debug, Clone, Copy)]
struct Timing {
    update: Duration,
    animation: Duration,
    error_display: Duration,
}

pub struct Overlay<C, G> {
    cpu: C,
    gpu: G,

    gpu_metric: Metric,
    breath_speed: f32,
    timing: Timing,

    gpu_temp: f32,
    cpu_usage: f32,
    gpu_phase: BreathPhase,
    cpu_phase: BreathPhase,

    // Read failures, cleared on the next sample or when they expire
    gpu_read_error: Option<&'static str>,
    cpu_read_error: Option<&'static str>,
    errors_expire_at: Option<Instant>,

    last_sample: Option<Instant>,
    last_frame: Option<Instant>,
}

impl<C: CpuSensor, G: GpuSensor> Overlay<C, G> {
    pub fn new(config: &Config, cpu: C, gpu: G) -> Self {
        if let Some(message) = gpu.status().message() {
            log::warn!("GPU bar unavailable: {}", message);
        }

        Self {
            cpu,
            gpu,
            gpu_metric: Metric::GpuTemperature {
                min: config.gpu.min_temp,
                max: config.gpu.max_temp,
            },
            breath_speed: config.style.breath_speed,
            timing: Timing {
                update: config.general.update_interval(),
                animation: config.general.animation_interval(),
                error_display: config.general.error_display(),
            },
            gpu_temp: INITIAL_GPU_TEMP,
            cpu_usage: FALLBACK_CPU_USAGE,
            gpu_phase: BreathPhase::new(),
            cpu_phase: BreathPhase::new(),
            gpu_read_error: None,
            cpu_read_error: None,
            errors_expire_at: None,
            last_sample: None,
            last_frame: None,
        }
    }

    /// Run whatever timers are due at `now`
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if is_due(self.last_sample, now, self.timing.update) {
            self.sample(now);
            self.last_sample = Some(now);
            outcome.sampled = true;
        }

        if is_due(self.last_frame, now, self.timing.animation) {
            self.animate();
            self.last_frame = Some(now);
            outcome.animated = true;
        }

        outcome.expired = self.expire_messages(now);
        outcome
    }

    /// Time until the next timer fires
    pub fn next_deadline(&self, now: Instant) -> Duration {
        let until = |last: Option<Instant>, every: Duration| match last {
            Some(last) => (last + every).saturating_duration_since(now),
            None => Duration::ZERO,
        };
        let mut next = until(self.last_sample, self.timing.update)
            .min(until(self.last_frame, self.timing.animation));
        if let Some(expiry) = self.errors_expire_at {
            next = next.min(expiry.saturating_duration_since(now));
        }
        next
    }

    /// Poll both sensors
    pub fn sample(&mut self, now: Instant) {
        self.gpu_read_error = None;
        self.cpu_read_error = None;
        self.errors_expire_at = None;

        if self.gpu.status().is_available() {
            match self.gpu.temperature() {
                Ok(temp) => self.gpu_temp = temp as f32,
                Err(e) => {
                    log::warn!("GPU temperature read error: {}", e);
                    self.gpu_read_error = Some(GPU_READ_FAIL);
                    self.errors_expire_at = Some(now + self.timing.error_display);
                }
            }
        }

        match self.cpu.sample() {
            Ok(Some(usage)) => self.cpu_usage = usage,
            Ok(None) => log::trace!("CPU sensor collecting baseline"),
            Err(e) => {
                log::warn!("CPU usage read error: {}", e);
                self.cpu_read_error = Some(CPU_READ_FAIL);
                self.cpu_usage = FALLBACK_CPU_USAGE;
                self.errors_expire_at = Some(now + self.timing.error_display);
            }
        }

        log::trace!(
            "sample: gpu={}°C cpu={:.1}%",
            self.gpu_temp,
            self.cpu_usage
        );
    }

    /// Advance the breathing phase of every healthy strip
    pub fn animate(&mut self) {
        if self.gpu_healthy() {
            let load = self.gpu_metric.normalize(self.gpu_temp);
            self.gpu_phase.advance(load, self.breath_speed);
        }
        if self.cpu_read_error.is_none() {
            let load = Metric::CpuUsage.normalize(self.cpu_usage);
            self.cpu_phase.advance(load, self.breath_speed);
        }
    }

    /// Drop read-failure messages whose display time has run out
    ///
    /// Returns whether anything was cleared.
    pub fn expire_messages(&mut self, now: Instant) -> bool {
        match self.errors_expire_at {
            Some(expiry) if now >= expiry => {
                self.gpu_read_error = None;
                self.cpu_read_error = None;
                self.errors_expire_at = None;
                true
            }
            _ => false,
        }
    }

    fn gpu_healthy(&self) -> bool {
        self.gpu.status().is_available() && self.gpu_read_error.is_none()
    }

    pub fn strip(&self, side: Side) -> StripState {
        match side {
            Side::Left => {
                if let Some(text) = self.gpu.status().message() {
                    StripState::Message { text }
                } else if let Some(text) = self.gpu_read_error {
                    StripState::Message {
                        text: text.to_string(),
                    }
                } else {
                    StripState::Glow {
                        color: self.gpu_metric.color(self.gpu_temp),
                        intensity: self.gpu_phase.intensity(),
                    }
                }
            }
            Side::Right => match self.cpu_read_error {
                Some(text) => StripState::Message {
                    text: text.to_string(),
                },
                None => StripState::Glow {
                    color: Metric::CpuUsage.color(self.cpu_usage),
                    intensity: self.cpu_phase.intensity(),
                },
            },
        }
    }

    pub fn gpu_temp(&self) -> f32 {
        self.gpu_temp
    }

    pub fn cpu_usage(&self) -> f32 {
        self.cpu_usage
    }

    pub fn gpu_status(&self) -> &GpuStatus {
        self.gpu.status()
    }

    pub fn gpu_phase(&self) -> BreathPhase {
        self.gpu_phase
    }

    pub fn cpu_phase(&self) -> BreathPhase {
        self.cpu_phase
    }
}

fn is_due(last: Option<Instant>, now: Instant, every: Duration) -> bool {
    match last {
        Some(last) => now.saturating_duration_since(last) >= every,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GlanceError, Result};
    use crate::sensors::NvmlGpuSensor;
    use std::collections::VecDeque;

    /// CPU sensor replaying a script of results
    struct ScriptedCpu {
        script: VecDeque<Result<Option<f32>>>,
        reads: usize,
    }

    impl ScriptedCpu {
        fn new(script: Vec<Result<Option<f32>>>) -> Self {
            Self {
                script: script.into(),
                reads: 0,
            }
        }

        fn steady(usage: f32) -> Self {
            Self::new((0..64).map(|_| Ok(Some(usage))).collect())
        }
    }

    impl CpuSensor for ScriptedCpu {
        fn sample(&mut self) -> Result<Option<f32>> {
            self.reads += 1;
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    /// GPU sensor replaying a script of temperatures
    struct ScriptedGpu {
        status: GpuStatus,
        script: VecDeque<Result<u32>>,
        reads: usize,
    }

    impl ScriptedGpu {
        fn available(script: Vec<Result<u32>>) -> Self {
            Self {
                status: GpuStatus::Available {
                    name: "Test GPU".to_string(),
                },
                script: script.into(),
                reads: 0,
            }
        }
    }

    impl GpuSensor for ScriptedGpu {
        fn status(&self) -> &GpuStatus {
            &self.status
        }

        fn temperature(&mut self) -> Result<u32> {
            self.reads += 1;
            self.script
                .pop_front()
                .unwrap_or_else(|| Err(GlanceError::Sensor("script exhausted".to_string())))
        }
    }

    fn sensor_error() -> GlanceError {
        GlanceError::Sensor("boom".to_string())
    }

    fn message(state: StripState) -> Option<String> {
        match state {
            StripState::Message { text } => Some(text),
            StripState::Glow { .. } => None,
        }
    }

    #[test]
    fn test_initial_values() {
        let overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::new(vec![]),
            ScriptedGpu::available(vec![]),
        );
        assert_eq!(overlay.gpu_temp(), INITIAL_GPU_TEMP);
        assert_eq!(overlay.cpu_usage(), FALLBACK_CPU_USAGE);
        assert!(matches!(overlay.strip(Side::Left), StripState::Glow { .. }));
        assert!(matches!(overlay.strip(Side::Right), StripState::Glow { .. }));
    }

    #[test]
    fn test_missing_binding_shows_message_and_cpu_continues() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::new(vec![Ok(Some(42.0)), Ok(Some(77.0))]),
            NvmlGpuSensor::unavailable(GpuStatus::BindingMissing),
        );
        let start = Instant::now();
        overlay.tick(start);
        assert_eq!(
            message(overlay.strip(Side::Left)).as_deref(),
            Some("NVIDIA Driver/NVML Missing")
        );
        assert_eq!(overlay.cpu_usage(), 42.0);

        overlay.tick(start + Duration::from_secs(1));
        assert_eq!(overlay.cpu_usage(), 77.0);
        assert!(matches!(overlay.strip(Side::Right), StripState::Glow { .. }));
    }

    #[test]
    fn test_no_gpu_found_message() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::steady(5.0),
            NvmlGpuSensor::unavailable(GpuStatus::NoDevice),
        );
        overlay.tick(Instant::now());
        assert_eq!(
            message(overlay.strip(Side::Left)).as_deref(),
            Some("No NVIDIA GPU Found")
        );
        assert!(matches!(overlay.strip(Side::Right), StripState::Glow { .. }));
    }

    #[test]
    fn test_unavailable_gpu_is_never_read() {
        let mut gpu = ScriptedGpu::available(vec![]);
        gpu.status = GpuStatus::InitError {
            kind: "Unknown".to_string(),
        };
        let mut overlay = Overlay::new(&Config::default(), ScriptedCpu::steady(5.0), gpu);
        let start = Instant::now();
        for second in 0..5 {
            overlay.tick(start + Duration::from_secs(second));
        }
        assert_eq!(overlay.gpu.reads, 0);
        assert_eq!(overlay.gpu_phase(), BreathPhase::new());
    }

    #[test]
    fn test_gpu_read_failure_is_transient() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::steady(20.0),
            ScriptedGpu::available(vec![Ok(45), Err(sensor_error()), Ok(48)]),
        );
        let start = Instant::now();

        overlay.tick(start);
        assert_eq!(overlay.gpu_temp(), 45.0);

        overlay.tick(start + Duration::from_secs(1));
        assert_eq!(
            message(overlay.strip(Side::Left)).as_deref(),
            Some(GPU_READ_FAIL)
        );
        // Last good reading is kept and the CPU strip is unaffected
        assert_eq!(overlay.gpu_temp(), 45.0);
        assert!(matches!(overlay.strip(Side::Right), StripState::Glow { .. }));

        overlay.tick(start + Duration::from_secs(2));
        assert_eq!(overlay.gpu_temp(), 48.0);
        assert!(matches!(overlay.strip(Side::Left), StripState::Glow { .. }));
    }

    #[test]
    fn test_cpu_read_failure_falls_back() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::new(vec![Ok(Some(90.0)), Err(sensor_error())]),
            ScriptedGpu::available(vec![Ok(40), Ok(41)]),
        );
        let start = Instant::now();
        overlay.tick(start);
        assert_eq!(overlay.cpu_usage(), 90.0);

        overlay.tick(start + Duration::from_secs(1));
        assert_eq!(overlay.cpu_usage(), FALLBACK_CPU_USAGE);
        assert_eq!(
            message(overlay.strip(Side::Right)).as_deref(),
            Some(CPU_READ_FAIL)
        );
        assert_eq!(overlay.gpu_temp(), 41.0);
        assert!(matches!(overlay.strip(Side::Left), StripState::Glow { .. }));
    }

    #[test]
    fn test_messages_expire_after_display_time() {
        let mut config = Config::default();
        // Samples far apart so only the expiry timer can clear the message
        config.general.update_interval_ms = 60_000;
        let mut overlay = Overlay::new(
            &config,
            ScriptedCpu::new(vec![Err(sensor_error())]),
            ScriptedGpu::available(vec![Err(sensor_error())]),
        );
        let start = Instant::now();
        overlay.tick(start);
        assert!(message(overlay.strip(Side::Left)).is_some());
        assert!(message(overlay.strip(Side::Right)).is_some());

        let outcome = overlay.tick(start + Duration::from_millis(2999));
        assert!(!outcome.expired);
        assert!(message(overlay.strip(Side::Right)).is_some());

        let outcome = overlay.tick(start + Duration::from_millis(3000));
        assert!(outcome.expired);
        assert!(message(overlay.strip(Side::Left)).is_none());
        assert!(message(overlay.strip(Side::Right)).is_none());
    }

    #[test]
    fn test_timers() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::steady(50.0),
            ScriptedGpu::available((0..8).map(|_| Ok(30)).collect()),
        );
        let start = Instant::now();
        assert_eq!(overlay.next_deadline(start), Duration::ZERO);

        let outcome = overlay.tick(start);
        assert!(outcome.sampled && outcome.animated);
        assert_eq!(overlay.next_deadline(start), Duration::from_millis(50));

        let outcome = overlay.tick(start + Duration::from_millis(20));
        assert!(!outcome.needs_repaint());

        let outcome = overlay.tick(start + Duration::from_millis(50));
        assert!(outcome.animated && !outcome.sampled);

        let outcome = overlay.tick(start + Duration::from_millis(1000));
        assert!(outcome.sampled);
        assert_eq!(overlay.cpu.reads, 2);
    }

    #[test]
    fn test_breathing_frozen_on_error() {
        let mut overlay = Overlay::new(
            &Config::default(),
            ScriptedCpu::new(vec![Err(sensor_error())]),
            ScriptedGpu::available(vec![Ok(50)]),
        );
        overlay.sample(Instant::now());
        for _ in 0..10 {
            overlay.animate();
        }
        assert_eq!(overlay.cpu_phase(), BreathPhase::new());
        assert!(overlay.gpu_phase().phase() > 0.0);
    }

    #[test]
    fn test_hotter_gpu_breathes_faster() {
        let mut cool = Overlay::new(
            &Config::default(),
            ScriptedCpu::steady(0.0),
            ScriptedGpu::available(vec![Ok(15)]),
        );
        let mut hot = Overlay::new(
            &Config::default(),
            ScriptedCpu::steady(100.0),
            ScriptedGpu::available(vec![Ok(50)]),
        );
        let now = Instant::now();
        cool.sample(now);
        hot.sample(now);
        cool.animate();
        hot.animate();
        assert!(hot.gpu_phase().phase() > cool.gpu_phase().phase());
        assert!(hot.cpu_phase().phase() > cool.cpu_phase().phase());
    }
}
