//! CLI for GlanceTemp

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use glancetemp::config::Config;
use glancetemp::overlay::Overlay;
use glancetemp::probe::{self, ProbeFormat};
use glancetemp::sensors::{NvmlGpuSensor, SystemCpuSensor};
use glancetemp::{GlanceError, Result};

#[derive(Parser)]
#[command(name = "glancetemp")]
#[command(about = "GlanceTemp: CPU usage and GPU temperature as glowing screen-edge bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to the per-user config path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sensor polling interval in milliseconds
    #[arg(short, long, global = true)]
    interval_ms: Option<u64>,

    /// Temperature mapped to the coolest color (°C)
    #[arg(long, global = true)]
    min_temp: Option<f32>,

    /// Temperature mapped to the hottest color (°C)
    #[arg(long, global = true)]
    max_temp: Option<f32>,

    /// NVML device index
    #[arg(long, global = true)]
    device: Option<u32>,

    /// Do not monitor the GPU
    #[arg(long, global = true)]
    no_gpu: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the overlay (default)
    Run,
    /// Print sensor readings without opening a window
    Probe {
        /// Number of samples to print
        #[arg(short = 'n', long, default_value = "5")]
        count: u32,
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Load the config file and apply command line overrides
    fn effective_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(interval) = self.interval_ms {
            config.general.update_interval_ms = interval;
        }
        if let Some(min_temp) = self.min_temp {
            config.gpu.min_temp = min_temp;
        }
        if let Some(max_temp) = self.max_temp {
            config.gpu.max_temp = max_temp;
        }
        if let Some(device) = self.device {
            config.gpu.device_index = device;
        }
        if self.no_gpu {
            config.gpu.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        None | Some(Commands::Run) => run_overlay(cli.effective_config()?),

        Some(Commands::Probe { count, format }) => {
            let format: ProbeFormat = format.parse()?;
            let config = cli.effective_config()?;
            let mut overlay = Overlay::new(
                &config,
                SystemCpuSensor::detect(),
                NvmlGpuSensor::open(&config.gpu),
            );
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            probe::run(
                &mut overlay,
                *count,
                config.general.update_interval(),
                format,
                &mut out,
            )
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => {
                println!("{}", cli.config_path().display());
                Ok(())
            }
            ConfigAction::Show => {
                print!("{}", cli.effective_config()?.to_toml()?);
                Ok(())
            }
            ConfigAction::Init { force } => {
                let path = cli.config_path();
                if path.exists() && !force {
                    return Err(GlanceError::Config(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                Config::default().save_to(&path)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        },
    }
}

#[cfg(feature = "gui")]
fn run_overlay(config: Config) -> Result<()> {
    glancetemp::gui::run(config)
}

#[cfg(not(feature = "gui"))]
fn run_overlay(_config: Config) -> Result<()> {
    Err(GlanceError::Unsupported(
        "built without the `gui` feature; try `glancetemp probe`".to_string(),
    ))
}
