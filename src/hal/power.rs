use super::exint::{ExtInt, Sense};
use crate::sleep::{LowPower, SleepMode};
use avr_device::atmega328p::CPU;
use avr_device::interrupt;

// SMCR: SM2..0 at bits 3..1, SE at bit 0
const SM_MASK: u8 = 0x0E;
const SE: u8 = 0x01;

pub struct Power {
    wake_line: Option<ExtInt>,
}

impl Power {
    pub fn new() -> Self {
        Self { wake_line: None }
    }

    /// Arm `line` as a wake source for each sleep period.
    ///
    /// Edge sensing needs the I/O clock, which power-down stops, so the line
    /// is armed level sensitive while asleep. Its handler must mask the line
    /// again (`ExtInt::disable`) or it keeps firing while the level is held.
    pub fn with_wake_line(line: ExtInt) -> Self {
        Self {
            wake_line: Some(line),
        }
    }

    #[inline]
    pub fn set_sleep_mode(&mut self, mode: SleepMode) {
        unsafe {
            (*CPU::ptr()).smcr.modify(|r, w| {
                w.bits((r.bits() & !SM_MASK) | ((mode as u8) << 1))
            });
        }
    }

    #[inline]
    pub fn enable_sleep(&mut self) {
        unsafe {
            (*CPU::ptr()).smcr.modify(|r, w| w.bits(r.bits() | SE));
        }
    }

    #[inline]
    pub fn disable_sleep(&mut self) {
        unsafe {
            (*CPU::ptr()).smcr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }

    /// Idle until the next interrupt; used between loop iterations
    pub fn enter_idle_mode(&mut self) {
        self.set_sleep_mode(SleepMode::Idle);
        self.enable_sleep();
        avr_device::asm::sleep();
        self.disable_sleep();
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}

impl LowPower for Power {
    fn enter(&mut self, mode: SleepMode) {
        self.set_sleep_mode(mode);
        if let Some(line) = self.wake_line {
            line.enable(Sense::LowLevel);
        }
    }

    fn suspend<F>(&mut self, woken: F)
    where
        F: Fn() -> bool,
    {
        interrupt::disable();
        if woken() {
            unsafe { interrupt::enable() };
            return;
        }
        self.enable_sleep();
        // SEI delays interrupts by one instruction, so a wake request that
        // arrives now still lands after SLEEP and resumes it
        unsafe { interrupt::enable() };
        avr_device::asm::sleep();
        self.disable_sleep();
    }

    fn exit(&mut self) {
        self.disable_sleep();
        if let Some(line) = self.wake_line {
            line.disable();
        }
    }
}
