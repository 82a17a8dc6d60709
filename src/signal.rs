//! Signal sources and their pending flags.
//!
//! Every source owns exactly one flag. Its interrupt handler sets it and
//! the main loop is the only code that clears it (or sets it back when it
//! could not act on a consumed event), so plain atomic loads and stores are
//! enough. No read-modify-write is used anywhere, which keeps this usable
//! on cores without CAS.

use core::sync::atomic::{AtomicBool, Ordering};
use ufmt::{uDisplay, uWrite, Formatter};

/// Every producer of an asynchronous event on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignalSource {
    PrimaryButton = 0,
    SecondaryButton = 1,
    Potentiometer = 2,
    LightSensor = 3,
    Distance = 4,
    SerialActivity = 5,
    PeriodicTimer = 6,
}

impl SignalSource {
    pub const COUNT: usize = 7;

    pub const ALL: [SignalSource; Self::COUNT] = [
        SignalSource::PrimaryButton,
        SignalSource::SecondaryButton,
        SignalSource::Potentiometer,
        SignalSource::LightSensor,
        SignalSource::Distance,
        SignalSource::SerialActivity,
        SignalSource::PeriodicTimer,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in log lines
    pub const fn label(self) -> &'static str {
        match self {
            SignalSource::PrimaryButton => "primary button",
            SignalSource::SecondaryButton => "secondary button",
            SignalSource::Potentiometer => "potentiometer",
            SignalSource::LightSensor => "light sensor",
            SignalSource::Distance => "distance",
            SignalSource::SerialActivity => "serial",
            SignalSource::PeriodicTimer => "timer",
        }
    }

    /// What happened when this source gets selected
    pub const fn describe(self) -> &'static str {
        match self {
            SignalSource::PrimaryButton => "primary button pressed",
            SignalSource::SecondaryButton => "secondary button pressed",
            SignalSource::Potentiometer => "potentiometer above 512",
            SignalSource::LightSensor => "light below 300 lux",
            SignalSource::Distance => "object closer than 50 cm",
            SignalSource::SerialActivity => "serial input received",
            SignalSource::PeriodicTimer => "periodic timer elapsed",
        }
    }
}

impl uDisplay for SignalSource {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.label())
    }
}

/// How the arbiter decides whether a source is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Latched by an interrupt handler, consumed when selected
    Edge,
    /// Sampled afresh whenever the arbiter reaches the source while idle
    Level,
}

/// Live condition of level-sensed sources (threshold comparators)
pub trait LevelSense {
    fn is_active(&mut self, source: SignalSource) -> bool;
}

impl<F> LevelSense for F
where
    F: FnMut(SignalSource) -> bool,
{
    fn is_active(&mut self, source: SignalSource) -> bool {
        self(source)
    }
}

/// No level-sensed inputs wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLevels;

impl LevelSense for NoLevels {
    fn is_active(&mut self, _source: SignalSource) -> bool {
        false
    }
}

/// One pending bit per source, shared between handlers and the main loop.
///
/// Meant to live in a `static` so interrupt handlers can reach it:
///
/// ```
/// use event_arbiter_firmware::{PendingSignals, SignalSource};
///
/// static SIGNALS: PendingSignals = PendingSignals::new();
///
/// SIGNALS.raise(SignalSource::PrimaryButton);
/// assert!(SIGNALS.take(SignalSource::PrimaryButton));
/// assert!(!SIGNALS.is_pending(SignalSource::PrimaryButton));
/// ```
pub struct PendingSignals {
    flags: [AtomicBool; SignalSource::COUNT],
}

impl PendingSignals {
    pub const fn new() -> Self {
        Self {
            flags: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
        }
    }

    /// Called from the source's interrupt handler. Raising an already
    /// pending flag is a no-op, so bursts collapse into one event.
    #[inline]
    pub fn raise(&self, source: SignalSource) {
        self.flags[source.index()].store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_pending(&self, source: SignalSource) -> bool {
        self.flags[source.index()].load(Ordering::Acquire)
    }

    /// Consume the flag. Only the main loop calls this.
    ///
    /// A handler firing between the load and the store is merged into the
    /// event being consumed (edge coalescing).
    #[inline]
    pub fn take(&self, source: SignalSource) -> bool {
        let flag = &self.flags[source.index()];
        if flag.load(Ordering::Acquire) {
            flag.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Snapshot of every pending bit, indexed by `SignalSource::index`
    pub fn snapshot(&self) -> [bool; SignalSource::COUNT] {
        let mut out = [false; SignalSource::COUNT];
        for source in SignalSource::ALL {
            out[source.index()] = self.is_pending(source);
        }
        out
    }
}

impl Default for PendingSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let signals = PendingSignals::new();
        assert_eq!(signals.snapshot(), [false; SignalSource::COUNT]);
    }

    #[test]
    fn raise_is_idempotent_and_take_consumes_once() {
        let signals = PendingSignals::new();
        signals.raise(SignalSource::PeriodicTimer);
        signals.raise(SignalSource::PeriodicTimer);
        signals.raise(SignalSource::PeriodicTimer);

        assert!(signals.take(SignalSource::PeriodicTimer));
        assert!(!signals.take(SignalSource::PeriodicTimer));
    }

    #[test]
    fn flags_are_independent() {
        let signals = PendingSignals::new();
        signals.raise(SignalSource::SecondaryButton);

        for source in SignalSource::ALL {
            assert_eq!(
                signals.is_pending(source),
                source == SignalSource::SecondaryButton
            );
        }
    }

    #[test]
    fn indices_match_all_table() {
        for (idx, source) in SignalSource::ALL.iter().enumerate() {
            assert_eq!(source.index(), idx);
        }
    }

    #[test]
    fn closures_sense_levels() {
        let mut dark_only = |s: SignalSource| s == SignalSource::LightSensor;
        assert!(dark_only.is_active(SignalSource::LightSensor));
        assert!(!dark_only.is_active(SignalSource::Potentiometer));
        assert!(!NoLevels.is_active(SignalSource::LightSensor));
    }
}
