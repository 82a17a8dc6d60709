use crate::config::CPU_FREQ_HZ;
use crate::os::{has_elapsed, Clock, TickCounter};
use avr_device::atmega328p::{TC0, TC1, TC2};
use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Stop => 0,
            Prescaler::Direct => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }
}

// TCCRnA / TCCRnB / TIMSKn bits
const WGM01: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;
const OCIE_A: u8 = 1 << 1;

// 16MHz / 64 = 250kHz, 250 counts per millisecond
const MILLIS_PRESCALER: Prescaler = Prescaler::Div64;
const MILLIS_TOP: u8 = (CPU_FREQ_HZ / MILLIS_PRESCALER.divisor() / 1000 - 1) as u8;

static MILLIS: Mutex<Cell<TickCounter>> = Mutex::new(Cell::new(TickCounter::new()));

/// Start the 1 ms system tick on Timer0 (CTC mode, compare A interrupt)
pub fn start_millis() {
    unsafe {
        let p = &*TC0::ptr();
        p.tccr0a.write(|w| w.bits(WGM01));
        p.ocr0a.write(|w| w.bits(MILLIS_TOP));
        p.tcnt0.write(|w| w.bits(0));
        p.tccr0b.write(|w| w.bits(MILLIS_PRESCALER as u8));
        p.timsk0.write(|w| w.bits(OCIE_A));
    }
}

/// Body of the `TIMER0_COMPA` handler
#[inline]
pub fn on_millis_tick() {
    interrupt::free(|cs| {
        let cell = MILLIS.borrow(cs);
        let mut counter = cell.get();
        counter.tick(1);
        cell.set(counter);
    });
}

/// Milliseconds since `start_millis`, wrapping
pub fn millis() -> u32 {
    interrupt::free(|cs| MILLIS.borrow(cs).get().get())
}

#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        millis()
    }
}

/// Busy wait on the system tick. Needs `start_millis` and interrupts on.
#[derive(Clone, Copy, Default)]
pub struct Delay;

impl DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        let start = millis();
        while !has_elapsed(millis(), start, ms) {}
    }
}

impl DelayMs<u16> for Delay {
    fn delay_ms(&mut self, ms: u16) {
        DelayMs::<u32>::delay_ms(self, u32::from(ms));
    }
}

/// Timer1 compare match as a periodic signal source
pub struct PeriodicTimer {
    _private: (),
}

impl PeriodicTimer {
    /// Longest period that fits in OCR1A at /1024
    pub const MAX_PERIOD_MS: u16 = 4194;

    const PRESCALER: Prescaler = Prescaler::Div1024;

    /// Compare value for a period; periods above `MAX_PERIOD_MS` saturate
    pub const fn compare_for(period_ms: u16) -> u16 {
        let ticks = CPU_FREQ_HZ / Self::PRESCALER.divisor() * period_ms as u32 / 1000;
        if ticks == 0 {
            0
        } else if ticks > u16::MAX as u32 + 1 {
            u16::MAX
        } else {
            (ticks - 1) as u16
        }
    }

    /// Fire `TIMER1_COMPA` every `period_ms`
    pub fn start(period_ms: u16) -> Self {
        unsafe {
            let p = &*TC1::ptr();
            p.tccr1a.write(|w| w.bits(0));
            p.tcnt1.write(|w| w.bits(0));
            p.ocr1a.write(|w| w.bits(Self::compare_for(period_ms)));
            p.tccr1b.write(|w| w.bits(WGM12 | Self::PRESCALER as u8));
            p.timsk1.write(|w| w.bits(OCIE_A));
        }
        Self { _private: () }
    }
}

// TC2 clock select has its own encoding; /8 happens to match TC0/TC1
const TC2_DIV8: u8 = 0b010;
// 16MHz / 8
const TICKS_PER_US: u32 = CPU_FREQ_HZ / 8 / 1_000_000;

/// Free-running Timer2 at 0.5 us per count, polled.
///
/// The 8-bit counter wraps every 128 us, so callers must sample it more
/// often than that. Busy loops do; long interrupt handlers would not.
#[derive(Clone, Copy)]
pub struct MicrosTimer {
    _private: (),
}

impl MicrosTimer {
    pub fn start() -> Self {
        unsafe {
            let p = &*TC2::ptr();
            p.tccr2a.write(|w| w.bits(0));
            p.tccr2b.write(|w| w.bits(TC2_DIV8));
        }
        Self { _private: () }
    }

    #[inline]
    fn count(&self) -> u8 {
        unsafe { (*TC2::ptr()).tcnt2.read().bits() }
    }

    /// Spin while `cond` holds. Returns the microseconds spent, or `None`
    /// once `limit_us` has passed with `cond` still true.
    pub fn wait_while<F>(&self, limit_us: u32, mut cond: F) -> Option<u32>
    where
        F: FnMut() -> bool,
    {
        let limit = limit_us.saturating_mul(TICKS_PER_US);
        let mut last = self.count();
        let mut ticks: u32 = 0;
        while cond() {
            let now = self.count();
            ticks += u32::from(now.wrapping_sub(last));
            last = now;
            if ticks >= limit {
                return None;
            }
        }
        Some(ticks / TICKS_PER_US)
    }
}

impl DelayUs<u16> for MicrosTimer {
    fn delay_us(&mut self, us: u16) {
        // always times out: that is the delay
        let _ = self.wait_while(u32::from(us), || true);
    }
}
