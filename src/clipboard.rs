//! Address copying through the terminal's clipboard (OSC 52).

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use tokio::time::Instant;

pub const DEFAULT_COPIED_DURATION: Duration = Duration::from_secs(2);

/// Escape sequence asking the terminal emulator to put `text` on the system
/// clipboard.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", general_purpose::STANDARD.encode(text))
}

/// Drives the transient "Copied!" indicator.
#[derive(Debug)]
pub struct CopyStatus {
    duration: Duration,
    last: Option<(String, Instant)>,
}

impl CopyStatus {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last: None,
        }
    }

    pub fn record(&mut self, text: &str, now: Instant) {
        self.last = Some((text.to_string(), now + self.duration));
    }

    pub fn is_copied(&self, text: &str, now: Instant) -> bool {
        matches!(&self.last, Some((copied, until)) if copied == text && now < *until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_wraps_base64_payload() {
        assert_eq!(osc52_sequence("0xabc"), "\x1b]52;c;MHhhYmM=\x07");
    }

    #[test]
    fn copied_flag_expires() {
        let now = Instant::now();
        let mut status = CopyStatus::new(DEFAULT_COPIED_DURATION);
        assert!(!status.is_copied("0xabc", now));

        status.record("0xabc", now);
        assert!(status.is_copied("0xabc", now + Duration::from_secs(1)));
        assert!(!status.is_copied("0xdef", now));
        assert!(!status.is_copied("0xabc", now + DEFAULT_COPIED_DURATION));
    }
}
