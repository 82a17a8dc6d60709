use crate::sleep::{WakeTimer, WatchdogTimeout};
use avr_device::atmega328p::{CPU, WDT};
use avr_device::interrupt;

// WDTCSR
const WDIE: u8 = 1 << 6;
const WDCE: u8 = 1 << 4;
const WDE: u8 = 1 << 3;
// MCUSR
const WDRF: u8 = 1 << 3;

/// Watchdog in interrupt mode: expiry raises `WDT`, never a reset
pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    // Timed sequence: WDCE|WDE, then the new value within four cycles
    fn configure(&mut self, value: u8) {
        interrupt::free(|_| unsafe {
            avr_device::asm::wdr();
            (*CPU::ptr()).mcusr.modify(|r, w| w.bits(r.bits() & !WDRF));
            let p = &*WDT::ptr();
            p.wdtcsr.modify(|r, w| w.bits(r.bits() | WDCE | WDE));
            p.wdtcsr.write(|w| w.bits(value));
        });
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeTimer for Watchdog {
    fn arm(&mut self, timeout: WatchdogTimeout) {
        self.configure(WDIE | timeout.prescaler_bits());
    }

    fn disarm(&mut self) {
        self.configure(0);
    }
}
