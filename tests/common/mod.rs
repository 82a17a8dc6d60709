//! Host-side stand-ins for the board: a shared millisecond clock, LEDs
//! whose level can be inspected, and a power/watchdog pair that turns
//! "sleep" into advancing simulated time.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use event_arbiter_firmware::os::Clock;
use event_arbiter_firmware::sleep::{LowPower, SleepMode, WakeTimer, WatchdogTimeout};
use event_arbiter_firmware::{SignalSource, WakeFlags};

#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl SimClock {
    pub fn starting_at(ms: u32) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn now(&self) -> u32 {
        self.0.get()
    }

    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.now()
    }
}

/// Indicator whose level is visible from the test through a shared board
#[derive(Clone)]
pub struct Led {
    board: Rc<RefCell<[bool; SignalSource::COUNT]>>,
    idx: usize,
}

impl OutputPin for Led {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.board.borrow_mut()[self.idx] = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.board.borrow_mut()[self.idx] = true;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Board(Rc<RefCell<[bool; SignalSource::COUNT]>>);

impl Board {
    pub fn leds(&self) -> [Led; SignalSource::COUNT] {
        std::array::from_fn(|idx| Led {
            board: self.0.clone(),
            idx,
        })
    }

    pub fn levels(&self) -> [bool; SignalSource::COUNT] {
        *self.0.borrow()
    }

    pub fn lit(&self) -> Vec<SignalSource> {
        SignalSource::ALL
            .into_iter()
            .filter(|s| self.levels()[s.index()])
            .collect()
    }

    pub fn force(&self, source: SignalSource, level: bool) {
        self.0.borrow_mut()[source.index()] = level;
    }
}

#[derive(Default)]
pub struct LogBuffer(pub String);

impl LogBuffer {
    pub fn lines(&self) -> Vec<&str> {
        self.0.lines().collect()
    }
}

impl ufmt::uWrite for LogBuffer {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}

pub struct SimDelay(pub SimClock);

impl DelayMs<u32> for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.advance(ms);
    }
}

/// Watchdog that records its deadline on the shared clock
#[derive(Clone)]
pub struct SimWatchdog {
    clock: SimClock,
    deadline: Rc<Cell<Option<u32>>>,
    pub armed_with: Rc<Cell<Option<WatchdogTimeout>>>,
}

impl SimWatchdog {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            deadline: Rc::new(Cell::new(None)),
            armed_with: Rc::new(Cell::new(None)),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.get().is_some()
    }
}

impl WakeTimer for SimWatchdog {
    fn arm(&mut self, timeout: WatchdogTimeout) {
        self.deadline
            .set(Some(self.clock.now().wrapping_add(timeout.as_millis())));
        self.armed_with.set(Some(timeout));
    }

    fn disarm(&mut self) {
        self.deadline.set(None);
    }
}

/// A scheduled wake event for the simulated CPU
#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// External interrupt at an absolute time
    External(u32),
    /// Resume without any wake flag (noise on an unrelated interrupt)
    Spurious(u32),
}

/// Sleeping jumps the clock to the next scheduled interrupt and runs the
/// matching handlers, just as the CPU would on wake.
pub struct SimPower<'a> {
    clock: SimClock,
    flags: &'a WakeFlags,
    watchdog: SimWatchdog,
    events: Vec<Event>,
    pub mode: Option<SleepMode>,
    pub in_low_power: bool,
    pub suspends: u32,
}

impl<'a> SimPower<'a> {
    pub fn new(clock: SimClock, flags: &'a WakeFlags, watchdog: SimWatchdog) -> Self {
        Self {
            clock,
            flags,
            watchdog,
            events: Vec::new(),
            mode: None,
            in_low_power: false,
            suspends: 0,
        }
    }

    pub fn schedule(&mut self, event: Event) {
        self.events.push(event);
    }
}

impl LowPower for SimPower<'_> {
    fn enter(&mut self, mode: SleepMode) {
        self.mode = Some(mode);
        self.in_low_power = true;
    }

    fn suspend<F>(&mut self, woken: F)
    where
        F: Fn() -> bool,
    {
        if woken() {
            return;
        }
        self.suspends += 1;

        let now = self.clock.now();
        let at = |e: &Event| match *e {
            Event::External(t) | Event::Spurious(t) => t,
        };
        let next_event = self.events.iter().map(at).filter(|t| *t >= now).min();
        let next = match (next_event, self.watchdog.deadline.get()) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => panic!("asleep with no wake source left"),
        };

        self.clock.set(next);
        if self.watchdog.deadline.get() == Some(next) {
            self.flags.signal_timeout();
            // interrupt mode keeps counting after it fires
            let period = self
                .watchdog
                .armed_with
                .get()
                .map_or(0, WatchdogTimeout::as_millis);
            self.watchdog.deadline.set(Some(next + period));
        }
        let fired: Vec<Event> = self
            .events
            .iter()
            .copied()
            .filter(|e| at(e) == next)
            .collect();
        self.events.retain(|e| at(e) != next);
        for event in fired {
            if let Event::External(_) = event {
                self.flags.signal_external();
            }
        }
    }

    fn exit(&mut self) {
        self.in_low_power = false;
    }
}
