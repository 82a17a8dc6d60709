use crate::hal::Uart;
use core::convert::Infallible;
use embedded_hal::serial::Write;

/// Log output over USART0
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new(uart: Uart) -> Self {
        Self { uart }
    }

    pub fn write_byte(&mut self, byte: u8) {
        // the USART write error type is Infallible
        nb::block!(self.uart.write(byte)).ok();
    }

    pub fn flush(&mut self) {
        nb::block!(self.uart.flush()).ok();
    }
}

impl ufmt::uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}
