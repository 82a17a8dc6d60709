use super::gpio::{Input, Pin};
use super::timer::MicrosTimer;
use crate::drivers::EchoTimer;
use embedded_hal::digital::v2::InputPin;

/// Echo line of the ranging sensor, timed on Timer2
pub struct EchoInput {
    pin: Pin<Input>,
    timer: MicrosTimer,
}

impl EchoInput {
    pub fn new(pin: Pin<Input>, timer: MicrosTimer) -> Self {
        Self { pin, timer }
    }
}

impl EchoTimer for EchoInput {
    fn pulse_width_us(&mut self, timeout_us: u32) -> Option<u32> {
        let pin = &self.pin;
        let high = || pin.is_high().unwrap_or(false);

        // a pulse already in progress would be measured short
        self.timer.wait_while(timeout_us, high)?;
        self.timer.wait_while(timeout_us, || !high())?;
        self.timer.wait_while(timeout_us, high)
    }
}
