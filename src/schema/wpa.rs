//! # WPA Pre-Shared Keys
//!
//! WPA-PSK keys are not sent as passphrases. The printer takes the 256-bit
//! key itself, derived as in IEEE 802.11i:
//!
//! ```text
//! PSK = PBKDF2-HMAC-SHA1(passphrase, salt = ESSID, 4096 iterations, 32 bytes)
//! ```
//!
//! and rendered as 64 uppercase hex digits.

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;

use crate::error::ZebraError;

/// PBKDF2 iteration count fixed by 802.11i
pub const PSK_ITERATIONS: u32 = 4096;

/// Derived key length in bytes
pub const PSK_LEN: usize = 32;

/// Derive the WPA pre-shared key for `passphrase` on network `essid`.
///
/// ```
/// use zebconf::schema::derive_psk;
///
/// assert_eq!(
///     derive_psk("IEEE", "password"),
///     "F42C6FC52DF0EBEF9EBB4B90B38A5F902E83FE1B135A70E23AED762E9710A12E"
/// );
/// ```
pub fn derive_psk(essid: &str, passphrase: &str) -> String {
    let mut key = [0u8; PSK_LEN];
    pbkdf2::pbkdf2_hmac::<Sha1>(
        passphrase.as_bytes(),
        essid.as_bytes(),
        PSK_ITERATIONS,
        &mut key,
    );
    hex::encode_upper(key)
}

/// WiFi authentication schemes understood by the provisioning workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiAuth {
    /// WPA with a pre-shared key
    #[default]
    WpaPsk,
}

impl FromStr for WifiAuth {
    type Err = ZebraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wpa_psk" | "wpa-psk" => Ok(Self::WpaPsk),
            _ => Err(ZebraError::UnsupportedAuth(s.to_string())),
        }
    }
}

impl fmt::Display for WifiAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WpaPsk => f.write_str("wpa_psk"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
