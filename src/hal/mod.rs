//! Register level wrappers for the ATmega328P.
//!
//! Only the peripherals the two firmware images touch are covered.

pub mod adc;
pub mod echo;
pub mod exint;
pub mod gpio;
pub mod power;
pub mod timer;
pub mod uart;
pub mod watchdog;

// Re-export commonly used types
pub use adc::{Adc, AdcChannel};
pub use echo::EchoInput;
pub use exint::{ExtInt, Sense};
pub use gpio::{board, Input, Output, Pin, Port};
pub use power::Power;
pub use timer::{millis, Delay, MicrosTimer, PeriodicTimer, Prescaler, SystemClock};
pub use uart::Uart;
pub use watchdog::Watchdog;
