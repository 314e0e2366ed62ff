use anyhow::{bail, Context, Result};
use api::{LogLevel, ModuleLogger, SensorDriver};
use common::{DriverConfig, DriverRuntime, SimulationConfig};
use libloading::{Library, Symbol};
use log::{debug, error, info, trace, warn};
use sim_module::{SimSettings, SimulatedSensor};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SIMULATED_DRIVER_NAME: &str = "simulated";

pub struct LoadedDriver {
    pub name: String,
    pub driver: Box<dyn SensorDriver>,
}

pub extern "C" fn module_log_callback(
    level: LogLevel,
    target: *const std::ffi::c_char,
    message: *const std::ffi::c_char,
) {
    unsafe {
        let target_str = std::ffi::CStr::from_ptr(target)
            .to_str()
            .unwrap_or("unknown");
        let message_str = std::ffi::CStr::from_ptr(message).to_str().unwrap_or("");

        match level {
            LogLevel::Error => error!(target: target_str, "{}", message_str),
            LogLevel::Warn => warn!(target: target_str, "{}", message_str),
            LogLevel::Info => info!(target: target_str, "{}", message_str),
            LogLevel::Debug => debug!(target: target_str, "{}", message_str),
            LogLevel::Trace => trace!(target: target_str, "{}", message_str),
        }
    }
}

pub fn driver_logger(name: &str) -> ModuleLogger {
    ModuleLogger::new(module_log_callback, format!("faceviz::drivers::{}", name))
}

pub fn simulated_settings(config: &SimulationConfig) -> SimSettings {
    SimSettings {
        body_count: config.body_count,
        tracked_bodies: config.tracked_bodies,
        fps: config.fps,
        availability_flap: config
            .availability_flap_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f32),
        ..SimSettings::default()
    }
}

/// `plugins/native`, or `../plugins/native` when started from a build directory.
pub fn native_plugins_dir() -> PathBuf {
    let native_plugins_dir = Path::new("plugins/native").to_path_buf();
    if !native_plugins_dir.exists() {
        let parent_native = Path::new("../plugins/native");
        if parent_native.exists() {
            return parent_native.to_path_buf();
        }
    }
    native_plugins_dir
}

pub fn load_native_driver(path: &Path) -> Result<Box<dyn SensorDriver>> {
    if !path.exists() {
        bail!("Native driver not found at {:?}", path);
    }
    unsafe {
        let lib = Library::new(path).with_context(|| format!("Failed to load {:?}", path))?;
        let func: Symbol<unsafe extern "C" fn() -> Box<dyn SensorDriver>> = lib
            .get(b"create_driver")
            .with_context(|| format!("{:?} does not export create_driver", path))?;
        let driver = func();
        // the driver's vtable lives in the library
        std::mem::forget(lib);
        Ok(driver)
    }
}

/// Resolves the configured driver, falling back to the built-in simulator when
/// the native one cannot be loaded.
pub fn load_driver(driver: &DriverConfig, simulation: &SimulationConfig) -> LoadedDriver {
    if driver.runtime == DriverRuntime::Native {
        let path = native_plugins_dir().join(&driver.active);
        info!("Loading driver: {:?}", path);
        match load_native_driver(&path) {
            Ok(native) => {
                info!("✓ Successfully loaded driver: {}", driver.active);
                return LoadedDriver {
                    name: driver.active.clone(),
                    driver: native,
                };
            }
            Err(e) => {
                error!("✗ Failed to load driver {:?}: {:#}", path, e);
                warn!("Falling back to the simulated sensor.");
            }
        }
    }

    LoadedDriver {
        name: SIMULATED_DRIVER_NAME.to_string(),
        driver: Box::new(SimulatedSensor::new(simulated_settings(simulation))),
    }
}
