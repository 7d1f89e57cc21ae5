//! QrFormat - Ticket Code Validation
//!
//! ## Responsibilities
//!
//! - Match decoded payloads against the event ticket pattern
//! - Bound-check the ticket number
//!
//! Ticket codes are `<PREFIX>-NNN`: a fixed three digit, zero padded number.
//! The default event accepts `EVENT2025-001` through `EVENT2025-200`.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Default event prefix
pub const DEFAULT_PREFIX: &str = "EVENT2025";
/// Lowest accepted ticket number
pub const DEFAULT_MIN: u16 = 1;
/// Highest accepted ticket number
pub const DEFAULT_MAX: u16 = 200;

/// Largest number representable in the fixed three digit field
const MAX_TICKET_NUMBER: u16 = 999;

/// Ticket format rule
#[derive(Debug, Clone)]
pub struct QrFormat {
    prefix: String,
    min: u16,
    max: u16,
    pattern: Regex,
}

impl QrFormat {
    /// Create a format rule for `prefix` accepting numbers in `min..=max`
    pub fn new(prefix: &str, min: u16, max: u16) -> Result<Self> {
        if prefix.is_empty() {
            return Err(Error::Validation("QR prefix must not be empty".to_string()));
        }
        if min > max || max > MAX_TICKET_NUMBER {
            return Err(Error::Validation(format!(
                "Invalid ticket range {}..={} (must fit three digits)",
                min, max
            )));
        }

        let pattern = Regex::new(&format!(r"^{}-(\d{{3}})$", regex::escape(prefix)))
            .map_err(|e| Error::Validation(format!("Invalid QR prefix: {}", e)))?;

        Ok(Self {
            prefix: prefix.to_string(),
            min,
            max,
            pattern,
        })
    }

    /// Ticket number of `text`, if it is a valid code
    pub fn parse(&self, text: &str) -> Option<u16> {
        let caps = self.pattern.captures(text)?;
        let number: u16 = caps.get(1)?.as_str().parse().ok()?;
        (self.min..=self.max).contains(&number).then_some(number)
    }

    pub fn is_valid(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn range(&self) -> (u16, u16) {
        (self.min, self.max)
    }
}

impl Default for QrFormat {
    fn default() -> Self {
        default_format().clone()
    }
}

fn default_format() -> &'static QrFormat {
    static DEFAULT: OnceLock<QrFormat> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        QrFormat::new(DEFAULT_PREFIX, DEFAULT_MIN, DEFAULT_MAX)
            .expect("default ticket format is well-formed")
    })
}

/// Validate a decoded payload against the default event format
pub fn is_valid_qr(text: &str) -> bool {
    default_format().is_valid(text)
}
