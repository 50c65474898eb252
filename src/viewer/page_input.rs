use std::time::{Duration, Instant};

/// Accumulates typed digits into a page number.
///
/// Digits typed within `timeout` of each other extend the same number; after
/// a pause the next digit starts over.
#[derive(Debug, Clone)]
pub struct PageInput {
    digits: String,
    last_input: Option<Instant>,
    timeout: Duration,
}

impl PageInput {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            digits: String::new(),
            last_input: None,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Add a digit and return the page number typed so far
    pub fn push_digit(&mut self, digit: char, now: Instant) -> Option<usize> {
        self.expire(now);
        if !digit.is_ascii_digit() {
            return None;
        }
        self.digits.push(digit);
        self.last_input = Some(now);
        self.digits.parse().ok()
    }

    /// Drop the typed digits if the pause since the last one ran out
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.last_input {
            Some(last) if now.saturating_duration_since(last) >= self.timeout => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// When the typed digits will be dropped
    pub fn deadline(&self) -> Option<Instant> {
        self.last_input.map(|last| last + self.timeout)
    }

    pub fn reset(&mut self) {
        self.digits.clear();
        self.last_input = None;
    }

    pub fn pending(&self) -> &str {
        &self.digits
    }

    pub fn is_pending(&self) -> bool {
        !self.digits.is_empty()
    }
}
