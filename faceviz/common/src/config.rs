use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where the sensor driver comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum DriverRuntime {
    /// Built-in simulated sensor
    #[default]
    #[serde(alias = "simulated", alias = "Sim", alias = "sim")]
    Simulated,
    /// Native driver (.dll/.so/.dylib) from plugins/native
    #[serde(alias = "native")]
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum OutputMode {
    #[default]
    #[serde(alias = "log")]
    Log,
    #[serde(alias = "jsonl", alias = "JsonLines")]
    Jsonl,
    #[serde(alias = "udp", alias = "UDP")]
    Udp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub runtime: DriverRuntime,
    /// File name of the native driver to load.
    pub active: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            runtime: DriverRuntime::default(),
            active: default_active_driver(),
        }
    }
}

fn default_active_driver() -> String {
    if cfg!(windows) {
        "sim_module.dll".to_string()
    } else if cfg!(target_os = "macos") {
        "libsim_module.dylib".to_string()
    } else {
        "libsim_module.so".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub path: String,
    pub address: String,
    pub port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            path: "frames.jsonl".to_string(),
            address: "127.0.0.1".to_string(),
            port: 9100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderStyle {
    pub face_shape_thickness: f32,
    pub text_font_size: f32,
    pub face_point_radius: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            face_shape_thickness: 8.0,
            text_font_size: 30.0,
            face_point_radius: 1.0,
        }
    }
}

/// Settings for the built-in simulated sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub body_count: usize,
    pub tracked_bodies: usize,
    pub fps: f32,
    /// Toggle sensor availability every this many seconds.
    pub availability_flap_secs: Option<f32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            body_count: 6,
            tracked_bodies: 2,
            fps: 30.0,
            availability_flap_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub driver: DriverConfig,
    pub output: OutputConfig,
    pub style: RenderStyle,
    pub simulation: SimulationConfig,
    pub event_queue_depth: usize,
    pub max_fps: Option<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            output: OutputConfig::default(),
            style: RenderStyle::default(),
            simulation: SimulationConfig::default(),
            event_queue_depth: 16,
            max_fps: None,
        }
    }
}

impl ViewerConfig {
    /// Loads the config at `path`, writing the defaults there first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading config from {:?}", path);
            let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
            let reader = std::io::BufReader::new(file);
            let config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            Ok(config)
        } else {
            info!("Config not found. Creating default at {:?}", path);
            let config = Self::default();
            let file =
                fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
            let writer = std::io::BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &config)?;
            Ok(config)
        }
    }
}
