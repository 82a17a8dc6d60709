//! Ultrasonic ranging (HC-SR04 style) as a level-sensed source.
//!
//! A 10 us trigger pulse starts a measurement; the sensor answers with an
//! echo pulse as long as the sound's round trip.

use crate::config::{DISTANCE_NEAR_CM, ECHO_TIMEOUT_US};
use crate::signal::{LevelSense, SignalSource};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// Measures the width of the echo pulse
pub trait EchoTimer {
    /// Microseconds the echo line stays high, or `None` when no complete
    /// pulse arrives within `timeout_us`
    fn pulse_width_us(&mut self, timeout_us: u32) -> Option<u32>;
}

/// Round trip at 343 m/s: 0.0343 cm per microsecond, halved
#[inline]
pub const fn echo_to_cm(width_us: u32) -> u32 {
    width_us.saturating_mul(343) / 20_000
}

#[inline]
pub const fn is_near(cm: u32) -> bool {
    cm < DISTANCE_NEAR_CM
}

pub struct DistanceSensor<TRIG, ECHO, D> {
    trig: TRIG,
    echo: ECHO,
    delay: D,
}

impl<TRIG, ECHO, D> DistanceSensor<TRIG, ECHO, D>
where
    TRIG: OutputPin,
    ECHO: EchoTimer,
    D: DelayUs<u16>,
{
    pub fn new(trig: TRIG, echo: ECHO, delay: D) -> Self {
        Self { trig, echo, delay }
    }

    /// One ranging cycle. A missing echo or a trigger fault gives `None`.
    pub fn measure_cm(&mut self) -> Option<u32> {
        self.trig.set_low().ok()?;
        self.delay.delay_us(2);
        self.trig.set_high().ok()?;
        self.delay.delay_us(10);
        self.trig.set_low().ok()?;
        self.echo.pulse_width_us(ECHO_TIMEOUT_US).map(echo_to_cm)
    }

    pub fn release(self) -> (TRIG, ECHO, D) {
        (self.trig, self.echo, self.delay)
    }
}

impl<TRIG, ECHO, D> LevelSense for DistanceSensor<TRIG, ECHO, D>
where
    TRIG: OutputPin,
    ECHO: EchoTimer,
    D: DelayUs<u16>,
{
    fn is_active(&mut self, source: SignalSource) -> bool {
        // no echo means nothing in range, never "near"
        source == SignalSource::Distance && self.measure_cm().map_or(false, is_near)
    }
}
