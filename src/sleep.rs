//! Sleep/wake cycle driven by two racing wake sources.
//!
//! The controller keeps its indicator on for an active period, powers the
//! CPU down with the watchdog armed in interrupt mode and stays asleep
//! until the external interrupt, the watchdog, or both have fired.
//!
//! Wake flags are cleared when entering sleep. The wait snapshots both of
//! them each time the CPU resumes, and the first snapshot with a flag set is
//! the reported outcome: "both" means both had fired when the wait noticed
//! either. A cause that fires later (say, the watchdog expiring before it is
//! disarmed in `Waking`) is discarded by the next sleep entry and is never
//! credited to any cycle.
//!
//! Liveness rests on the watchdog: if neither source ever fired, the
//! controller would stay in [`SleepState::Asleep`] forever.

use crate::logger;
use core::sync::atomic::{AtomicBool, Ordering};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use ufmt::uWrite;

use crate::config::SleepConfig;

/// ATmega328P sleep modes (SMCR.SM2..0)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0,
    AdcNoiseReduction = 1,
    PowerDown = 2,
    PowerSave = 3,
    Standby = 6,
    ExtendedStandby = 7,
}

/// Watchdog prescaler selections (nominal 128 kHz oscillator)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms125 = 3,
    Ms250 = 4,
    Ms500 = 5,
    Ms1000 = 6,
    Ms2000 = 7,
    Ms4000 = 8,
    Ms8000 = 9,
}

impl WatchdogTimeout {
    pub const fn as_millis(self) -> u32 {
        16 << (self as u8)
    }

    /// WDP3..0 laid out as in WDTCSR (WDP3 sits at bit 5)
    pub const fn prescaler_bits(self) -> u8 {
        let n = self as u8;
        (n & 0x07) | ((n & 0x08) << 2)
    }
}

/// Entry and exit of the CPU's low power state
pub trait LowPower {
    fn enter(&mut self, mode: SleepMode);

    /// Halt until any enabled interrupt fires.
    ///
    /// Implementations must not halt if `woken()` already holds; on hardware
    /// the check and the sleep instruction are made atomic with respect to
    /// interrupts.
    fn suspend<F>(&mut self, woken: F)
    where
        F: Fn() -> bool;

    fn exit(&mut self);
}

/// Watchdog used as a wake timer (interrupt mode, no reset)
pub trait WakeTimer {
    fn arm(&mut self, timeout: WatchdogTimeout);
    fn disarm(&mut self);
}

/// Why the CPU left sleep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeCause {
    External,
    Timeout,
    Both,
}

/// Flags observed for one sleep cycle. Both can be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WakeOutcome {
    pub by_external: bool,
    pub by_timeout: bool,
}

impl WakeOutcome {
    pub const fn any(&self) -> bool {
        self.by_external || self.by_timeout
    }

    pub const fn cause(&self) -> Option<WakeCause> {
        match (self.by_external, self.by_timeout) {
            (true, true) => Some(WakeCause::Both),
            (true, false) => Some(WakeCause::External),
            (false, true) => Some(WakeCause::Timeout),
            (false, false) => None,
        }
    }
}

/// The two wake flags, each set by exactly one interrupt handler
pub struct WakeFlags {
    external: AtomicBool,
    timeout: AtomicBool,
}

impl WakeFlags {
    pub const fn new() -> Self {
        Self {
            external: AtomicBool::new(false),
            timeout: AtomicBool::new(false),
        }
    }

    /// External interrupt handler
    #[inline]
    pub fn signal_external(&self) {
        self.external.store(true, Ordering::Release);
    }

    /// Watchdog interrupt handler
    #[inline]
    pub fn signal_timeout(&self) {
        self.timeout.store(true, Ordering::Release);
    }

    /// Either flag, read without precedence
    #[inline]
    pub fn any(&self) -> bool {
        let external = self.external.load(Ordering::Acquire);
        let timeout = self.timeout.load(Ordering::Acquire);
        external || timeout
    }

    pub fn snapshot(&self) -> WakeOutcome {
        WakeOutcome {
            by_external: self.external.load(Ordering::Acquire),
            by_timeout: self.timeout.load(Ordering::Acquire),
        }
    }

    pub fn clear(&self) {
        self.external.store(false, Ordering::Release);
        self.timeout.store(false, Ordering::Release);
    }
}

impl Default for WakeFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepState {
    Active,
    EnteringSleep,
    Asleep,
    Waking,
}

pub struct SleepController<'a, P, D, S, T> {
    flags: &'a WakeFlags,
    indicator: P,
    delay: D,
    power: S,
    watchdog: T,
    config: SleepConfig,
    state: SleepState,
    spurious_wakes: u16,
    observed: WakeOutcome,
    last: Option<WakeOutcome>,
}

impl<'a, P, D, S, T, E> SleepController<'a, P, D, S, T>
where
    P: OutputPin<Error = E>,
    D: DelayMs<u32>,
    S: LowPower,
    T: WakeTimer,
{
    pub fn new(
        flags: &'a WakeFlags,
        indicator: P,
        delay: D,
        power: S,
        watchdog: T,
        config: SleepConfig,
    ) -> Self {
        Self {
            flags,
            indicator,
            delay,
            power,
            watchdog,
            config,
            state: SleepState::Active,
            spurious_wakes: 0,
            observed: WakeOutcome::default(),
            last: None,
        }
    }

    pub fn state(&self) -> SleepState {
        self.state
    }

    /// Outcome of the most recent completed cycle
    pub fn last_outcome(&self) -> Option<WakeOutcome> {
        self.last
    }

    /// Resumptions that found neither wake flag set
    pub fn spurious_wakes(&self) -> u16 {
        self.spurious_wakes
    }

    /// Run the current state's work and move to the next state.
    ///
    /// Returns the wake outcome when the step completes a cycle
    /// (`Waking -> Active`).
    pub fn step<W>(&mut self, log: &mut W) -> Result<Option<WakeOutcome>, E>
    where
        W: uWrite + ?Sized,
    {
        match self.state {
            SleepState::Active => {
                self.indicator.set_high()?;
                logger::system(log, "LED on, active period");
                self.delay.delay_ms(self.config.active_ms);
                self.state = SleepState::EnteringSleep;
                Ok(None)
            }
            SleepState::EnteringSleep => {
                self.indicator.set_low()?;
                logger::system(log, "LED off, entering sleep mode");
                // stale causes from the previous cycle must not count
                self.flags.clear();
                self.watchdog.arm(self.config.watchdog);
                self.power.enter(self.config.mode);
                self.state = SleepState::Asleep;
                Ok(None)
            }
            SleepState::Asleep => {
                let flags = self.flags;
                self.observed = loop {
                    self.power.suspend(|| flags.any());
                    let seen = flags.snapshot();
                    if seen.any() {
                        break seen;
                    }
                    self.spurious_wakes = self.spurious_wakes.wrapping_add(1);
                    if cfg!(feature = "debug") {
                        logger::spurious_wake(log, self.spurious_wakes);
                    }
                };
                self.state = SleepState::Waking;
                Ok(None)
            }
            SleepState::Waking => {
                self.power.exit();
                self.watchdog.disarm();
                let outcome = self.observed;
                logger::wake(log, outcome.cause());
                self.last = Some(outcome);
                self.delay.delay_ms(self.config.settle_ms);
                self.state = SleepState::Active;
                Ok(Some(outcome))
            }
        }
    }

    /// Step until one full sleep cycle has completed
    pub fn run_cycle<W>(&mut self, log: &mut W) -> Result<WakeOutcome, E>
    where
        W: uWrite + ?Sized,
    {
        loop {
            if let Some(outcome) = self.step(log)? {
                return Ok(outcome);
            }
        }
    }

    pub fn release(self) -> (P, D, S, T) {
        (self.indicator, self.delay, self.power, self.watchdog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_timeouts_double() {
        assert_eq!(WatchdogTimeout::Ms16.as_millis(), 16);
        assert_eq!(WatchdogTimeout::Ms1000.as_millis(), 1024);
        assert_eq!(WatchdogTimeout::Ms8000.as_millis(), 8192);
    }

    #[test]
    fn prescaler_bits_split_wdp3() {
        assert_eq!(WatchdogTimeout::Ms2000.prescaler_bits(), 0b0000_0111);
        assert_eq!(WatchdogTimeout::Ms4000.prescaler_bits(), 0b0010_0000);
        assert_eq!(WatchdogTimeout::Ms8000.prescaler_bits(), 0b0010_0001);
    }

    #[test]
    fn outcome_classification() {
        let none = WakeOutcome::default();
        assert_eq!(none.cause(), None);
        assert!(!none.any());

        let both = WakeOutcome {
            by_external: true,
            by_timeout: true,
        };
        assert_eq!(both.cause(), Some(WakeCause::Both));
    }

    #[test]
    fn flags_clear_together() {
        let flags = WakeFlags::new();
        flags.signal_external();
        flags.signal_timeout();
        assert_eq!(flags.snapshot().cause(), Some(WakeCause::Both));

        flags.clear();
        assert!(!flags.any());
    }
}
