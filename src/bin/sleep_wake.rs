//! Sleep/wake firmware: LED on for five seconds, then power-down until the
//! button on D2 or the ~8 s watchdog wakes the CPU.
#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use event_arbiter_firmware::config::SleepConfig;
    use event_arbiter_firmware::drivers::SerialConsole;
    use event_arbiter_firmware::hal::{board, timer, Delay, ExtInt, Power, Uart, Watchdog};
    use event_arbiter_firmware::logger;
    use event_arbiter_firmware::sleep::WakeTimer;
    use event_arbiter_firmware::{SleepController, WakeFlags};

    static WAKE: WakeFlags = WakeFlags::new();

    #[avr_device::entry]
    fn main() -> ! {
        let mut watchdog = Watchdog::new();
        watchdog.disarm();

        let mut console = SerialConsole::new(Uart::new());
        let _button = board::primary_button();
        timer::start_millis();

        let mut controller = SleepController::new(
            &WAKE,
            board::status_led(),
            Delay,
            Power::with_wake_line(ExtInt::Int0),
            watchdog,
            SleepConfig::default(),
        );

        // Enable interrupts globally
        unsafe { avr_device::interrupt::enable() };

        logger::system(&mut console, "sleep/wake controller started");

        loop {
            // pin errors are Infallible on this target
            controller.step(&mut console).ok();
        }
    }

    #[avr_device::interrupt(atmega328p)]
    fn INT0() {
        WAKE.signal_external();
        // level sensed while asleep: mask until the next sleep entry
        ExtInt::Int0.disable();
    }

    #[avr_device::interrupt(atmega328p)]
    fn WDT() {
        WAKE.signal_timeout();
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER0_COMPA() {
        timer::on_millis_tick();
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("sleep_wake targets the ATmega328P; build with an AVR target");
}
