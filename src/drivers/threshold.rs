use crate::config::{LIGHT_DARK_ADC_MIN, POT_THRESHOLD};
use crate::signal::{LevelSense, SignalSource};
use core::marker::PhantomData;
use embedded_hal::adc::{Channel, OneShot};

#[inline]
pub const fn pot_active(raw: u16) -> bool {
    raw > POT_THRESHOLD
}

#[inline]
pub const fn is_dark(raw: u16) -> bool {
    raw >= LIGHT_DARK_ADC_MIN
}

/// Potentiometer and light sensor sampled through a one-shot ADC.
///
/// Both inputs are level sensed: each query starts a fresh conversion.
/// A failed conversion reads as "not active".
pub struct ThresholdSensors<ADC, A, POT, LIGHT> {
    adc: A,
    pot: POT,
    light: LIGHT,
    _adc: PhantomData<ADC>,
}

impl<ADC, A, POT, LIGHT> ThresholdSensors<ADC, A, POT, LIGHT> {
    pub fn new(adc: A, pot: POT, light: LIGHT) -> Self {
        Self {
            adc,
            pot,
            light,
            _adc: PhantomData,
        }
    }

    pub fn release(self) -> (A, POT, LIGHT) {
        (self.adc, self.pot, self.light)
    }
}

impl<ADC, A, POT, LIGHT> LevelSense for ThresholdSensors<ADC, A, POT, LIGHT>
where
    A: OneShot<ADC, u16, POT> + OneShot<ADC, u16, LIGHT>,
    POT: Channel<ADC>,
    LIGHT: Channel<ADC>,
{
    fn is_active(&mut self, source: SignalSource) -> bool {
        match source {
            SignalSource::Potentiometer => {
                nb::block!(OneShot::<ADC, u16, POT>::read(&mut self.adc, &mut self.pot))
                    .map_or(false, pot_active)
            }
            SignalSource::LightSensor => {
                nb::block!(OneShot::<ADC, u16, LIGHT>::read(&mut self.adc, &mut self.light))
                    .map_or(false, is_dark)
            }
            _ => false,
        }
    }
}
