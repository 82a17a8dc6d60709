//! Console log lines for the control loops.
//!
//! Writes go to any `ufmt::uWrite` sink. Logging is best effort: a failed
//! write is dropped so the console can never hold up the control loop.

use crate::signal::SignalSource;
use crate::sleep::WakeCause;
use ufmt::{uwrite, uwriteln, uWrite};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System,
    Event,
    Wake,
}

impl LogType {
    pub const fn tag(self) -> &'static str {
        match self {
            LogType::System => "[SYS] ",
            LogType::Event => "[EVT] ",
            LogType::Wake => "[WAKE] ",
        }
    }
}

/// Plain text line with a category tag
pub fn line<W>(w: &mut W, log_type: LogType, msg: &str)
where
    W: uWrite + ?Sized,
{
    uwriteln!(w, "{}{}", log_type.tag(), msg).ok();
}

pub fn system<W>(w: &mut W, msg: &str)
where
    W: uWrite + ?Sized,
{
    line(w, LogType::System, msg);
}

/// The arbiter committed to `source`
pub fn selected<W>(w: &mut W, source: SignalSource, highest: bool)
where
    W: uWrite + ?Sized,
{
    uwrite!(w, "{}interrupt - {}", LogType::Event.tag(), source.describe()).ok();
    if highest {
        uwrite!(w, " (highest priority)").ok();
    }
    uwriteln!(w, "").ok();
}

/// The hold time for `source` ran out
pub fn released<W>(w: &mut W, source: SignalSource, now: u32)
where
    W: uWrite + ?Sized,
{
    uwriteln!(w, "{}released {} at {} ms", LogType::Event.tag(), source, now).ok();
}

pub fn wake<W>(w: &mut W, cause: Option<WakeCause>)
where
    W: uWrite + ?Sized,
{
    let msg = match cause {
        Some(WakeCause::External) => "wake: external interrupt (button)",
        Some(WakeCause::Timeout) => "wake: watchdog timer",
        Some(WakeCause::Both) => "wake: external interrupt and watchdog timer",
        None => "wake: unknown cause",
    };
    line(w, LogType::Wake, msg);
}

pub fn spurious_wake<W>(w: &mut W, count: u16)
where
    W: uWrite + ?Sized,
{
    uwriteln!(w, "{}spurious wake #{}, sleeping again", LogType::Wake.tag(), count).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Buf(std::string::String);

    impl uWrite for Buf {
        type Error = Infallible;
        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn selection_lines_name_the_source() {
        let mut buf = Buf::default();
        selected(&mut buf, SignalSource::PrimaryButton, true);
        selected(&mut buf, SignalSource::PeriodicTimer, false);
        assert_eq!(
            buf.0,
            "[EVT] interrupt - primary button pressed (highest priority)\n\
             [EVT] interrupt - periodic timer elapsed\n"
        );
    }

    #[test]
    fn every_wake_cause_has_its_own_line() {
        let causes = [
            Some(WakeCause::External),
            Some(WakeCause::Timeout),
            Some(WakeCause::Both),
            None,
        ];
        let lines: std::vec::Vec<std::string::String> = causes
            .iter()
            .map(|cause| {
                let mut buf = Buf::default();
                wake(&mut buf, *cause);
                buf.0
            })
            .collect();

        for (i, a) in lines.iter().enumerate() {
            assert!(a.starts_with("[WAKE] "));
            for b in &lines[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn release_line_carries_time() {
        let mut buf = Buf::default();
        released(&mut buf, SignalSource::SerialActivity, 4100);
        assert_eq!(buf.0, "[EVT] released serial at 4100 ms\n");
    }
}
