//! Application layer for the event display firmware
//! Runs one pass of the arbitration loop per call to [`EventDisplay::poll`]

use crate::actuator::{ActiveAction, TimedActuator};
use crate::arbiter::Arbiter;
use crate::config::ArbiterConfig;
use crate::drivers::IndicatorBank;
use crate::logger;
use crate::signal::{LevelSense, PendingSignals, Trigger};
use embedded_hal::digital::v2::OutputPin;
use ufmt::uWrite;

/// Main loop state: shared flags in, one lit indicator out
pub struct EventDisplay<'a, P, L> {
    signals: &'a PendingSignals,
    arbiter: Arbiter,
    actuator: TimedActuator<P>,
    levels: L,
}

impl<'a, P, L, E> EventDisplay<'a, P, L>
where
    P: OutputPin<Error = E>,
    L: LevelSense,
{
    pub fn new(
        signals: &'a PendingSignals,
        indicators: IndicatorBank<P>,
        levels: L,
        config: ArbiterConfig,
    ) -> Self {
        Self {
            signals,
            arbiter: Arbiter::new(config.order),
            actuator: TimedActuator::new(indicators, config.hold_ms),
            levels,
        }
    }

    /// One loop iteration at time `now`.
    ///
    /// The running action is released first if its hold is over; then, if
    /// idle, a new one is selected in the same pass. Returns the action
    /// started by this call, if any.
    ///
    /// If the indicator cannot be driven the error is returned, nothing is
    /// logged and an edge-triggered winner stays pending.
    pub fn poll<W>(&mut self, now: u32, log: &mut W) -> Result<Option<ActiveAction>, E>
    where
        W: uWrite + ?Sized,
    {
        if let Some(ended) = self.actuator.tick(now)? {
            if cfg!(feature = "debug") {
                logger::released(log, ended.source, now);
            }
        }

        if !self.actuator.is_idle() {
            return Ok(None);
        }

        let Some(action) = self
            .arbiter
            .arbitrate(now, self.signals, &mut self.levels)
        else {
            return Ok(None);
        };

        if let Err(e) = self.actuator.start(action) {
            // arbitrate consumed the edge; keep it for the next pass
            if self.arbiter.order().trigger(action.source) == Some(Trigger::Edge) {
                self.signals.raise(action.source);
            }
            return Err(e);
        }

        let highest = self.arbiter.order().rank(action.source) == Some(0);
        logger::selected(log, action.source, highest);
        Ok(Some(action))
    }

    pub fn active(&self) -> Option<ActiveAction> {
        self.actuator.active()
    }

    pub fn indicators(&self) -> &IndicatorBank<P> {
        self.actuator.indicators()
    }

    pub fn release(self) -> (IndicatorBank<P>, L) {
        (self.actuator.release(), self.levels)
    }
}
