//! # Response Patterns
//!
//! Device output has no consistent structure or delimiter. The read loop
//! keeps accumulating bytes until the *whole* buffer matches an expected
//! pattern, or until the device goes quiet.

use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::error::ZebraError;

static QUOTED: OnceLock<Expect> = OnceLock::new();

/// A pattern that must match an entire response buffer.
#[derive(Debug, Clone)]
pub struct Expect {
    regex: Regex,
}

impl Expect {
    /// Compile `pattern`, anchored at both ends of the buffer.
    ///
    /// `.` does not match line breaks.
    pub fn new(pattern: &str) -> Result<Self, ZebraError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| ZebraError::Value(format!("bad response pattern {:?}: {}", pattern, e)))?;
        Ok(Self { regex })
    }

    /// A single quoted string, which is how `getvar` values come back.
    ///
    /// Values are raw bytes in the printer's codepage, so `.` here is any
    /// byte except `\n`, not just valid UTF-8.
    pub fn quoted() -> &'static Expect {
        QUOTED.get_or_init(|| {
            Expect::new(r#"(?-u)".+?""#).expect("quoted-value pattern is valid")
        })
    }

    /// Whether the whole of `buf` matches.
    pub fn matches(&self, buf: &[u8]) -> bool {
        self.regex.is_match(buf)
    }
}

// ============================================================================
// TESTS
// ============================================================================
