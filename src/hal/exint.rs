use avr_device::atmega328p::EXINT;

/// INT0 (PD2) and INT1 (PD3)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtInt {
    Int0 = 0,
    Int1 = 1,
}

/// EICRA ISCn1:ISCn0 encodings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Sense {
    /// The only sense that can wake the CPU from power-down
    LowLevel = 0b00,
    AnyChange = 0b01,
    FallingEdge = 0b10,
    RisingEdge = 0b11,
}

impl ExtInt {
    #[inline]
    const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    /// Select the sense and unmask the interrupt, dropping any stale request
    pub fn enable(self, sense: Sense) {
        let shift = (self as u8) * 2;
        unsafe {
            let p = &*EXINT::ptr();
            p.eicra.modify(|r, w| {
                w.bits((r.bits() & !(0b11 << shift)) | ((sense as u8) << shift))
            });
            // flags are cleared by writing one
            p.eifr.write(|w| w.bits(self.mask()));
            p.eimsk.modify(|r, w| w.bits(r.bits() | self.mask()));
        }
    }

    pub fn disable(self) {
        unsafe {
            (*EXINT::ptr())
                .eimsk
                .modify(|r, w| w.bits(r.bits() & !self.mask()));
        }
    }
}
