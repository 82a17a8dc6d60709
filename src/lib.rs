//! Event arbitration and sleep/wake control for an ATmega328P board.
//!
//! Interrupt handlers only raise flags in [`signal::PendingSignals`] or
//! [`sleep::WakeFlags`]. The main loop owns everything else: the
//! [`application::EventDisplay`] picks one pending event by priority and
//! holds its indicator, and the [`sleep::SleepController`] cycles the CPU
//! through active and power-down periods.
//!
//! The core modules are hardware independent and run on the host under
//! `cargo test`. Register level code lives in [`hal`] and is only built for
//! AVR targets.
#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod application;
pub mod arbiter;
pub mod config;
pub mod drivers;
pub mod logger;
pub mod os;
pub mod signal;
pub mod sleep;

#[cfg(target_arch = "avr")]
pub mod hal;

pub use actuator::{ActiveAction, TimedActuator};
pub use application::EventDisplay;
pub use arbiter::{Arbiter, ConfigError, PriorityEntry, PriorityOrder};
pub use signal::{LevelSense, PendingSignals, SignalSource, Trigger};
pub use sleep::{SleepController, SleepState, WakeCause, WakeFlags, WakeOutcome};
