//! Event display firmware: buttons, analog thresholds, an ultrasonic range
//! sensor, serial input and a 1 Hz timer compete for a single indicator,
//! highest priority first.
#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use event_arbiter_firmware::config::{ArbiterConfig, PERIODIC_TIMER_MS};
    use event_arbiter_firmware::drivers::{
        DistanceSensor, IndicatorBank, SerialConsole, ThresholdSensors,
    };
    use event_arbiter_firmware::hal::adc::{A0, A1};
    use event_arbiter_firmware::hal::{
        board, timer, Adc, EchoInput, ExtInt, MicrosTimer, PeriodicTimer, Power, Sense,
        SystemClock, Uart, Watchdog,
    };
    use event_arbiter_firmware::logger;
    use event_arbiter_firmware::os::Clock;
    use event_arbiter_firmware::sleep::WakeTimer;
    use event_arbiter_firmware::{EventDisplay, LevelSense, PendingSignals, SignalSource};

    static SIGNALS: PendingSignals = PendingSignals::new();

    #[avr_device::entry]
    fn main() -> ! {
        // a watchdog left running by a previous image would reset us
        Watchdog::new().disarm();

        let _primary = board::primary_button();
        let _secondary = board::secondary_button();
        ExtInt::Int0.enable(Sense::FallingEdge);
        ExtInt::Int1.enable(Sense::FallingEdge);

        timer::start_millis();
        let _tick = PeriodicTimer::start(PERIODIC_TIMER_MS);

        let mut uart = Uart::new();
        // bytes that arrived during reset are not an event
        Uart::drain_rx();
        uart.enable_rx_interrupt();
        let mut console = SerialConsole::new(uart);

        let mut analog: ThresholdSensors<Adc, _, _, _> = ThresholdSensors::new(Adc::new(), A1, A0);
        let micros = MicrosTimer::start();
        let mut ranging = DistanceSensor::new(
            board::range_trigger(),
            EchoInput::new(board::range_echo(), micros),
            micros,
        );
        let levels = move |source: SignalSource| match source {
            SignalSource::Distance => ranging.is_active(source),
            _ => analog.is_active(source),
        };

        let mut display = EventDisplay::new(
            &SIGNALS,
            IndicatorBank::new(board::indicators()),
            levels,
            ArbiterConfig::default(),
        );
        let clock = SystemClock;
        let mut power = Power::new();

        // Enable interrupts globally
        unsafe { avr_device::interrupt::enable() };

        logger::system(&mut console, "event arbiter ready");

        loop {
            // pin errors are Infallible on this target
            display.poll(clock.now_ms(), &mut console).ok();
            // the 1 ms tick bounds how long this idles
            power.enter_idle_mode();
        }
    }

    #[avr_device::interrupt(atmega328p)]
    fn INT0() {
        SIGNALS.raise(SignalSource::PrimaryButton);
    }

    #[avr_device::interrupt(atmega328p)]
    fn INT1() {
        SIGNALS.raise(SignalSource::SecondaryButton);
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER1_COMPA() {
        SIGNALS.raise(SignalSource::PeriodicTimer);
    }

    #[avr_device::interrupt(atmega328p)]
    fn USART_RX() {
        Uart::drain_rx();
        SIGNALS.raise(SignalSource::SerialActivity);
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER0_COMPA() {
        timer::on_millis_tick();
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("event_arbiter_firmware targets the ATmega328P; build with an AVR target");
}
