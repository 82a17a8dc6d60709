//! Holds the selected event's indicator for a fixed time.

use crate::drivers::IndicatorBank;
use crate::os::has_elapsed;
use crate::signal::SignalSource;
use embedded_hal::digital::v2::OutputPin;

/// The one event currently on display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveAction {
    pub source: SignalSource,
    pub started_at: u32,
}

impl ActiveAction {
    pub const fn new(source: SignalSource, started_at: u32) -> Self {
        Self { source, started_at }
    }

    #[inline]
    pub fn is_expired(&self, now: u32, hold_ms: u32) -> bool {
        has_elapsed(now, self.started_at, hold_ms)
    }
}

pub struct TimedActuator<P> {
    indicators: IndicatorBank<P>,
    active: Option<ActiveAction>,
    hold_ms: u32,
}

impl<P, E> TimedActuator<P>
where
    P: OutputPin<Error = E>,
{
    pub fn new(indicators: IndicatorBank<P>, hold_ms: u32) -> Self {
        Self {
            indicators,
            active: None,
            hold_ms,
        }
    }

    /// Start displaying `action`.
    ///
    /// A running action is never preempted: while one is active the call
    /// does nothing and returns `Ok(false)`.
    pub fn start(&mut self, action: ActiveAction) -> Result<bool, E> {
        if self.active.is_some() {
            return Ok(false);
        }
        self.indicators.show(action.source)?;
        self.active = Some(action);
        Ok(true)
    }

    /// Release the indicator once the hold time is over.
    ///
    /// Runs every loop iteration. Returns the action that just ended.
    pub fn tick(&mut self, now: u32) -> Result<Option<ActiveAction>, E> {
        match self.active {
            Some(action) if action.is_expired(now, self.hold_ms) => {
                self.indicators.set_all_low()?;
                self.active = None;
                Ok(Some(action))
            }
            _ => Ok(None),
        }
    }

    pub fn active(&self) -> Option<ActiveAction> {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn hold_ms(&self) -> u32 {
        self.hold_ms
    }

    pub fn indicators(&self) -> &IndicatorBank<P> {
        &self.indicators
    }

    pub fn release(self) -> IndicatorBank<P> {
        self.indicators
    }
}
