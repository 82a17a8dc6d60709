use avr_device::atmega328p::{PORTB, PORTC, PORTD};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    B,
    C,
    D,
}

/// A single I/O line. Port and bit are runtime values so pins on
/// different ports share one type and fit in one array.
#[derive(Debug)]
pub struct Pin<MODE> {
    port: Port,
    bit: u8,
    _mode: PhantomData<MODE>,
}

#[derive(Clone, Copy)]
enum Reg {
    Ddr,
    Out,
}

// Read-modify-write of DDRx / PORTx: clear `clear`, then set `set`
fn update(port: Port, reg: Reg, set: u8, clear: u8) {
    unsafe {
        match (port, reg) {
            (Port::B, Reg::Ddr) => (*PORTB::ptr()).ddrb.modify(|r, w| w.bits((r.bits() & !clear) | set)),
            (Port::B, Reg::Out) => (*PORTB::ptr()).portb.modify(|r, w| w.bits((r.bits() & !clear) | set)),
            (Port::C, Reg::Ddr) => (*PORTC::ptr()).ddrc.modify(|r, w| w.bits((r.bits() & !clear) | set)),
            (Port::C, Reg::Out) => (*PORTC::ptr()).portc.modify(|r, w| w.bits((r.bits() & !clear) | set)),
            (Port::D, Reg::Ddr) => (*PORTD::ptr()).ddrd.modify(|r, w| w.bits((r.bits() & !clear) | set)),
            (Port::D, Reg::Out) => (*PORTD::ptr()).portd.modify(|r, w| w.bits((r.bits() & !clear) | set)),
        }
    }
}

fn read_pins(port: Port) -> u8 {
    unsafe {
        match port {
            Port::B => (*PORTB::ptr()).pinb.read().bits(),
            Port::C => (*PORTC::ptr()).pinc.read().bits(),
            Port::D => (*PORTD::ptr()).pind.read().bits(),
        }
    }
}

impl Pin<Input> {
    /// Floating input, the reset state of every line
    pub const fn new(port: Port, bit: u8) -> Self {
        Pin {
            port,
            bit,
            _mode: PhantomData,
        }
    }
}

impl<MODE: PinMode> Pin<MODE> {
    pub fn into_output(self) -> Pin<Output> {
        let mask = 1 << self.bit;
        update(self.port, Reg::Ddr, mask, 0);
        Pin {
            port: self.port,
            bit: self.bit,
            _mode: PhantomData,
        }
    }

    pub fn into_pull_up_input(self) -> Pin<Input> {
        let mask = 1 << self.bit;
        update(self.port, Reg::Ddr, 0, mask);
        update(self.port, Reg::Out, mask, 0);
        Pin {
            port: self.port,
            bit: self.bit,
            _mode: PhantomData,
        }
    }

    pub fn port(&self) -> Port {
        self.port
    }

    pub fn bit(&self) -> u8 {
        self.bit
    }
}

impl OutputPin for Pin<Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        let mask = 1 << self.bit;
        update(self.port, Reg::Out, mask, 0);
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mask = 1 << self.bit;
        update(self.port, Reg::Out, 0, mask);
        Ok(())
    }
}

impl InputPin for Pin<Input> {
    type Error = Infallible;

    #[inline]
    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(read_pins(self.port) & (1 << self.bit) != 0)
    }

    #[inline]
    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

// Arduino Uno pin map
pub mod board {
    use super::*;
    use crate::signal::SignalSource;

    /// D2 / INT0: primary button and external wake line
    pub fn primary_button() -> Pin<Input> {
        Pin::new(Port::D, 2).into_pull_up_input()
    }

    /// D3 / INT1
    pub fn secondary_button() -> Pin<Input> {
        Pin::new(Port::D, 3).into_pull_up_input()
    }

    /// One indicator per `SignalSource`, in index order: D4..D7 for the
    /// buttons and analog inputs, D10 for distance, D8/D9 for serial and timer
    pub fn indicators() -> [Pin<Output>; SignalSource::COUNT] {
        [
            Pin::new(Port::D, 4).into_output(),
            Pin::new(Port::D, 5).into_output(),
            Pin::new(Port::D, 6).into_output(),
            Pin::new(Port::D, 7).into_output(),
            Pin::new(Port::B, 2).into_output(),
            Pin::new(Port::B, 0).into_output(),
            Pin::new(Port::B, 1).into_output(),
        ]
    }

    /// D11, ranging sensor TRIG
    pub fn range_trigger() -> Pin<Output> {
        Pin::new(Port::B, 3).into_output()
    }

    /// D12, ranging sensor ECHO
    pub fn range_echo() -> Pin<Input> {
        Pin::new(Port::B, 4)
    }

    /// D13, the on-board LED
    pub fn status_led() -> Pin<Output> {
        Pin::new(Port::B, 5).into_output()
    }
}
