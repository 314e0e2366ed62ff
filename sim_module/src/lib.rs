pub mod mapper;
pub mod simulated;

use api::SensorDriver;
pub use mapper::KinectColorMapper;
pub use simulated::{SimSettings, SimulatedSensor};

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_driver() -> Box<dyn SensorDriver> {
    Box::new(SimulatedSensor::new(SimSettings::default()))
}
