use avr_device::atmega328p::ADC;
use core::convert::Infallible;
use embedded_hal::adc::{Channel, OneShot};

// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcReference {
    Aref = 0,            // External AREF
    Avcc = 1,            // AVCC with external cap at AREF
    Internal1_1V = 3,    // Internal 1.1V with external cap at AREF
}

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

/// Single channel input, A0..A5
pub trait AdcChannel {
    const MUX: u8;
}

macro_rules! adc_channel {
    ($($name:ident = $mux:expr),*) => {
        $(
            pub struct $name;

            impl AdcChannel for $name {
                const MUX: u8 = $mux;
            }

            impl Channel<Adc> for $name {
                type ID = u8;
                fn channel() -> u8 {
                    $mux
                }
            }
        )*
    };
}

adc_channel!(A0 = 0, A1 = 1, A2 = 2, A3 = 3, A4 = 4, A5 = 5);

pub struct Adc {
    // channel with a conversion in flight
    converting: Option<u8>,
}

impl Adc {
    pub fn new() -> Self {
        unsafe {
            let p = &*ADC::ptr();
            // Enable ADC, prescaler div128 (125kHz @ 16MHz)
            p.adcsra.write(|w| w.bits(ADEN | AdcPrescaler::Div128 as u8));
            // Reference voltage = AVCC
            p.admux.write(|w| w.bits((AdcReference::Avcc as u8) << 6));
        }
        Self { converting: None }
    }

    fn start(&mut self, mux: u8) {
        unsafe {
            let p = &*ADC::ptr();
            p.admux.modify(|r, w| w.bits((r.bits() & 0xF0) | (mux & 0x0F)));
            p.adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
        }
        self.converting = Some(mux);
    }

    fn busy(&self) -> bool {
        unsafe { (*ADC::ptr()).adcsra.read().bits() & ADSC != 0 }
    }

    fn result(&self) -> u16 {
        unsafe { (*ADC::ptr()).adc.read().bits() }
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}

impl<PIN> OneShot<Adc, u16, PIN> for Adc
where
    PIN: Channel<Adc, ID = u8> + AdcChannel,
{
    type Error = Infallible;

    fn read(&mut self, _pin: &mut PIN) -> nb::Result<u16, Infallible> {
        match self.converting {
            Some(mux) if mux == PIN::MUX => {
                if self.busy() {
                    return Err(nb::Error::WouldBlock);
                }
                self.converting = None;
                Ok(self.result())
            }
            // another channel still converting: let it finish first
            Some(_) if self.busy() => Err(nb::Error::WouldBlock),
            _ => {
                self.start(PIN::MUX);
                Err(nb::Error::WouldBlock)
            }
        }
    }
}
