//! Priority selection among pending signals.
//!
//! The order lives in a [`PriorityOrder`] value rather than in code, so
//! moving a source up or down is a configuration change.

use crate::actuator::ActiveAction;
use crate::signal::{LevelSense, PendingSignals, SignalSource, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// An order needs at least one source
    Empty,
    /// Each source may appear only once
    Duplicate(SignalSource),
}

/// One slot in the priority list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityEntry {
    pub source: SignalSource,
    pub trigger: Trigger,
}

impl PriorityEntry {
    pub const fn edge(source: SignalSource) -> Self {
        Self {
            source,
            trigger: Trigger::Edge,
        }
    }

    pub const fn level(source: SignalSource) -> Self {
        Self {
            source,
            trigger: Trigger::Level,
        }
    }
}

/// Sources ordered from highest to lowest priority.
///
/// Sources left out of the order are never selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityOrder {
    entries: [PriorityEntry; SignalSource::COUNT],
    len: usize,
}

impl PriorityOrder {
    pub fn new(entries: &[PriorityEntry]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut seen = [false; SignalSource::COUNT];
        let mut order = Self {
            entries: [PriorityEntry::edge(SignalSource::PrimaryButton); SignalSource::COUNT],
            len: 0,
        };

        for entry in entries {
            let idx = entry.source.index();
            if seen[idx] {
                return Err(ConfigError::Duplicate(entry.source));
            }
            seen[idx] = true;
            order.entries[order.len] = *entry;
            order.len += 1;
        }

        Ok(order)
    }

    /// Edge-triggered order over the given sources
    pub fn edges(sources: &[SignalSource]) -> Result<Self, ConfigError> {
        // checked up front: a list longer than the enum always repeats
        if let Some(dup) = first_duplicate(sources) {
            return Err(ConfigError::Duplicate(dup));
        }

        let mut entries = [PriorityEntry::edge(SignalSource::PrimaryButton); SignalSource::COUNT];
        for (slot, source) in entries.iter_mut().zip(sources) {
            *slot = PriorityEntry::edge(*source);
        }
        Self::new(&entries[..sources.len()])
    }

    pub fn entries(&self) -> &[PriorityEntry] {
        &self.entries[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of `source` in the order, 0 being the highest priority
    pub fn rank(&self, source: SignalSource) -> Option<usize> {
        self.entries().iter().position(|e| e.source == source)
    }

    /// How `source` is sensed, `None` if it is not in the order
    pub fn trigger(&self, source: SignalSource) -> Option<Trigger> {
        self.entries()
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.trigger)
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        Self {
            entries: crate::config::DEFAULT_PRIORITY,
            len: SignalSource::COUNT,
        }
    }
}

fn first_duplicate(sources: &[SignalSource]) -> Option<SignalSource> {
    let mut seen = [false; SignalSource::COUNT];
    for source in sources {
        if seen[source.index()] {
            return Some(*source);
        }
        seen[source.index()] = true;
    }
    None
}

/// Picks at most one pending source per idle cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arbiter {
    order: PriorityOrder,
}

impl Arbiter {
    pub fn new(order: PriorityOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &PriorityOrder {
        &self.order
    }

    /// Select the highest priority pending source and start an action for it.
    ///
    /// Must only be called while no action is running. Edge flags of the
    /// winner are cleared; every lower priority source is left untouched so
    /// it competes again on the next idle cycle. Level sources are sampled
    /// only when the walk reaches them.
    pub fn arbitrate<L>(
        &self,
        now: u32,
        pending: &PendingSignals,
        levels: &mut L,
    ) -> Option<ActiveAction>
    where
        L: LevelSense + ?Sized,
    {
        self.order
            .entries()
            .iter()
            .find(|entry| match entry.trigger {
                Trigger::Edge => pending.take(entry.source),
                Trigger::Level => levels.is_active(entry.source),
            })
            .map(|entry| ActiveAction::new(entry.source, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::NoLevels;
    use SignalSource::*;

    #[test]
    fn rejects_empty_and_duplicate_orders() {
        assert_eq!(PriorityOrder::new(&[]), Err(ConfigError::Empty));
        assert_eq!(
            PriorityOrder::edges(&[PrimaryButton, PeriodicTimer, PrimaryButton]),
            Err(ConfigError::Duplicate(PrimaryButton))
        );
        assert_eq!(
            PriorityOrder::edges(&[
                PrimaryButton,
                SecondaryButton,
                Potentiometer,
                LightSensor,
                SerialActivity,
                PeriodicTimer,
                SerialActivity,
            ]),
            Err(ConfigError::Duplicate(SerialActivity))
        );
    }

    #[test]
    fn default_order_matches_board_priorities() {
        let order = PriorityOrder::default();
        let sources: [SignalSource; SignalSource::COUNT] =
            core::array::from_fn(|i| order.entries()[i].source);
        assert_eq!(sources, SignalSource::ALL);
        assert_eq!(order.entries()[2].trigger, Trigger::Level);
        assert_eq!(order.entries()[3].trigger, Trigger::Level);
        assert_eq!(order.entries()[4].trigger, Trigger::Level);
        assert_eq!(order.rank(Distance), Some(4));
        assert_eq!(order.trigger(Distance), Some(Trigger::Level));
        assert_eq!(order.trigger(SerialActivity), Some(Trigger::Edge));
        assert_eq!(order.rank(PeriodicTimer), Some(6));
    }

    #[test]
    fn nothing_pending_has_no_side_effect() {
        let arbiter = Arbiter::new(PriorityOrder::edges(&SignalSource::ALL).unwrap());
        let pending = PendingSignals::new();
        assert_eq!(arbiter.arbitrate(0, &pending, &mut NoLevels), None);
        assert_eq!(pending.snapshot(), [false; SignalSource::COUNT]);
    }

    #[test]
    fn picks_highest_and_leaves_the_rest_pending() {
        let arbiter = Arbiter::new(PriorityOrder::edges(&SignalSource::ALL).unwrap());
        let pending = PendingSignals::new();
        pending.raise(PeriodicTimer);
        pending.raise(SecondaryButton);
        pending.raise(SerialActivity);

        let action = arbiter.arbitrate(42, &pending, &mut NoLevels).unwrap();
        assert_eq!(action.source, SecondaryButton);
        assert_eq!(action.started_at, 42);
        assert!(!pending.is_pending(SecondaryButton));
        assert!(pending.is_pending(SerialActivity));
        assert!(pending.is_pending(PeriodicTimer));
    }

    #[test]
    fn reordering_is_data_only() {
        let arbiter =
            Arbiter::new(PriorityOrder::edges(&[PeriodicTimer, PrimaryButton]).unwrap());
        let pending = PendingSignals::new();
        pending.raise(PrimaryButton);
        pending.raise(PeriodicTimer);

        let first = arbiter.arbitrate(0, &pending, &mut NoLevels).unwrap();
        assert_eq!(first.source, PeriodicTimer);
    }

    #[test]
    fn sources_outside_the_order_are_ignored() {
        let arbiter = Arbiter::new(PriorityOrder::edges(&[PrimaryButton]).unwrap());
        let pending = PendingSignals::new();
        pending.raise(SerialActivity);

        assert_eq!(arbiter.arbitrate(0, &pending, &mut NoLevels), None);
        assert!(pending.is_pending(SerialActivity));
    }

    #[test]
    fn level_sources_are_sampled_not_latched() {
        let order = PriorityOrder::new(&[
            PriorityEntry::edge(PrimaryButton),
            PriorityEntry::level(LightSensor),
            PriorityEntry::edge(PeriodicTimer),
        ])
        .unwrap();
        let arbiter = Arbiter::new(order);
        let pending = PendingSignals::new();
        // a stale flag on a level source means nothing
        pending.raise(LightSensor);
        pending.raise(PeriodicTimer);

        let mut dark = false;
        let mut levels = |s: SignalSource| s == LightSensor && dark;
        assert_eq!(
            arbiter.arbitrate(0, &pending, &mut levels).map(|a| a.source),
            Some(PeriodicTimer)
        );

        dark = true;
        let mut levels = |s: SignalSource| s == LightSensor && dark;
        pending.raise(PeriodicTimer);
        assert_eq!(
            arbiter.arbitrate(0, &pending, &mut levels).map(|a| a.source),
            Some(LightSensor)
        );
        assert!(pending.is_pending(PeriodicTimer));
    }

    #[test]
    fn level_sources_below_the_winner_are_not_sampled() {
        let order = PriorityOrder::new(&[
            PriorityEntry::edge(PrimaryButton),
            PriorityEntry::level(Potentiometer),
        ])
        .unwrap();
        let arbiter = Arbiter::new(order);
        let pending = PendingSignals::new();
        pending.raise(PrimaryButton);

        let mut sampled = 0;
        let mut levels = |_: SignalSource| {
            sampled += 1;
            true
        };
        let action = arbiter.arbitrate(0, &pending, &mut levels).unwrap();
        assert_eq!(action.source, PrimaryButton);
        assert_eq!(sampled, 0);
    }
}
