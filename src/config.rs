//! Configuration constants for the event arbiter firmware

use crate::arbiter::{PriorityEntry, PriorityOrder};
use crate::signal::SignalSource;
use crate::sleep::{SleepMode, WatchdogTimeout};

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// How long a selected event keeps its indicator lit
pub const HOLD_DURATION_MS: u32 = 2000;

/// Period of the Timer1 signal source (1 Hz)
pub const PERIODIC_TIMER_MS: u16 = 1000;

/// Indicator on-time before the sleep/wake firmware powers down
pub const ACTIVE_PERIOD_MS: u32 = 5000;

/// Pause after a wake before the next active period starts
pub const WAKE_SETTLE_MS: u32 = 1000;

/// Watchdog interval used as the fallback wake source
pub const WATCHDOG_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms8000;

/// Potentiometer reading (10-bit) above which the source is active
pub const POT_THRESHOLD: u16 = 512;

/// LDR divider reading at or above which the scene is darker than ~300 lux.
///
/// Derived offline for a 2k pull-down, RL10 = 50k, gamma = 0.7 at AVCC = 5V.
pub const LIGHT_DARK_ADC_MIN: u16 = 324;

/// Ranging result below which the distance source is active
pub const DISTANCE_NEAR_CM: u32 = 50;

/// Longest echo waited for, about 5 m of range
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// Runtime settings for the arbitration engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbiterConfig {
    pub order: PriorityOrder,
    pub hold_ms: u32,
}

impl ArbiterConfig {
    pub fn new(order: PriorityOrder, hold_ms: u32) -> Self {
        Self { order, hold_ms }
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            order: PriorityOrder::default(),
            hold_ms: HOLD_DURATION_MS,
        }
    }
}

/// The order used by the board firmware: buttons first, analog thresholds
/// and the ranging sensor sampled live, then serial traffic and finally the
/// periodic tick.
pub const DEFAULT_PRIORITY: [PriorityEntry; SignalSource::COUNT] = [
    PriorityEntry::edge(SignalSource::PrimaryButton),
    PriorityEntry::edge(SignalSource::SecondaryButton),
    PriorityEntry::level(SignalSource::Potentiometer),
    PriorityEntry::level(SignalSource::LightSensor),
    PriorityEntry::level(SignalSource::Distance),
    PriorityEntry::edge(SignalSource::SerialActivity),
    PriorityEntry::edge(SignalSource::PeriodicTimer),
];

/// Runtime settings for the sleep/wake cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepConfig {
    pub active_ms: u32,
    pub settle_ms: u32,
    pub watchdog: WatchdogTimeout,
    pub mode: SleepMode,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            active_ms: ACTIVE_PERIOD_MS,
            settle_ms: WAKE_SETTLE_MS,
            watchdog: WATCHDOG_TIMEOUT,
            mode: SleepMode::PowerDown,
        }
    }
}
