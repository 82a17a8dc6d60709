use crate::signal::SignalSource;
use embedded_hal::digital::v2::OutputPin;

/// One indicator output per signal source, indexed by `SignalSource`.
pub struct IndicatorBank<P> {
    leds: [P; SignalSource::COUNT],
    lit: Option<SignalSource>,
}

impl<P, E> IndicatorBank<P>
where
    P: OutputPin<Error = E>,
{
    pub fn new(leds: [P; SignalSource::COUNT]) -> Self {
        Self { leds, lit: None }
    }

    /// Light exactly one indicator.
    ///
    /// Every other output is driven low first, whatever state the bank
    /// was left in, so two indicators are never high together.
    pub fn show(&mut self, source: SignalSource) -> Result<(), E> {
        for (idx, led) in self.leds.iter_mut().enumerate() {
            if idx != source.index() {
                led.set_low()?;
            }
        }
        self.leds[source.index()].set_high()?;
        self.lit = Some(source);
        Ok(())
    }

    pub fn set_all_low(&mut self) -> Result<(), E> {
        for led in self.leds.iter_mut() {
            led.set_low()?;
        }
        self.lit = None;
        Ok(())
    }

    /// Source whose indicator was last driven high, if any
    pub fn lit(&self) -> Option<SignalSource> {
        self.lit
    }

    pub fn release(self) -> [P; SignalSource::COUNT] {
        self.leds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction};

    fn low_only() -> PinMock {
        PinMock::new(&[Transaction::set(State::Low)])
    }

    #[test]
    fn show_clears_the_others_before_lighting() {
        let target = PinMock::new(&[Transaction::set(State::High)]);
        let mut bank = IndicatorBank::new([
            low_only(),
            low_only(),
            target,
            low_only(),
            low_only(),
            low_only(),
            low_only(),
        ]);

        bank.show(SignalSource::Potentiometer).unwrap();
        assert_eq!(bank.lit(), Some(SignalSource::Potentiometer));

        for mut pin in bank.release() {
            pin.done();
        }
    }

    #[test]
    fn set_all_low_drives_every_output() {
        let mut bank = IndicatorBank::new(core::array::from_fn(|_| low_only()));

        bank.set_all_low().unwrap();
        assert_eq!(bank.lit(), None);

        for mut pin in bank.release() {
            pin.done();
        }
    }
}
