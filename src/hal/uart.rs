use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use avr_device::atmega328p::USART0;
use core::convert::Infallible;
use embedded_hal::serial::{Read, Write};

// UCSR0A
const RXC0: u8 = 1 << 7;
const UDRE0: u8 = 1 << 5;
// UCSR0B
const RXCIE0: u8 = 1 << 7;
const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;
// UCSR0C: asynchronous, 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0x06;

/// Baud rate divisor for normal speed mode
pub const fn ubrr_for(baud: u32) -> u16 {
    (CPU_FREQ_HZ / (16 * baud) - 1) as u16
}

/// USART0 in polled transmit mode
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new() -> Self {
        Self::with_baud(UART_BAUD)
    }

    pub fn with_baud(baud: u32) -> Self {
        unsafe {
            let p = &*USART0::ptr();
            p.ubrr0.write(|w| w.bits(ubrr_for(baud)));
            p.ucsr0c.write(|w| w.bits(FRAME_8N1));
            p.ucsr0b.write(|w| w.bits(RXEN0 | TXEN0));
        }
        Self { _private: () }
    }

    /// Fire `USART_RX` whenever a byte arrives
    pub fn enable_rx_interrupt(&mut self) {
        unsafe {
            (*USART0::ptr()).ucsr0b.modify(|r, w| w.bits(r.bits() | RXCIE0));
        }
    }

    /// Discard everything in the receive buffer, returning the count.
    ///
    /// Reading UDR0 is what clears the RX complete condition, so the RX
    /// interrupt handler must call this or it will re-enter immediately.
    pub fn drain_rx() -> u8 {
        let mut drained = 0u8;
        unsafe {
            let p = &*USART0::ptr();
            while p.ucsr0a.read().bits() & RXC0 != 0 {
                let _ = p.udr0.read().bits();
                drained = drained.saturating_add(1);
            }
        }
        drained
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl Read<u8> for Uart {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        unsafe {
            let p = &*USART0::ptr();
            if p.ucsr0a.read().bits() & RXC0 == 0 {
                return Err(nb::Error::WouldBlock);
            }
            Ok(p.udr0.read().bits())
        }
    }
}

impl Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        unsafe {
            let p = &*USART0::ptr();
            if p.ucsr0a.read().bits() & UDRE0 == 0 {
                return Err(nb::Error::WouldBlock);
            }
            p.udr0.write(|w| w.bits(byte));
        }
        Ok(())
    }

    /// Done once the data register has been handed to the shifter
    fn flush(&mut self) -> nb::Result<(), Infallible> {
        unsafe {
            if (*USART0::ptr()).ucsr0a.read().bits() & UDRE0 == 0 {
                return Err(nb::Error::WouldBlock);
            }
        }
        Ok(())
    }
}
