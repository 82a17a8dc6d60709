pub mod distance;
pub mod indicators;
pub mod threshold;

#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use distance::{DistanceSensor, EchoTimer};
pub use indicators::IndicatorBank;
pub use threshold::ThresholdSensors;

#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
