//! # Connection Configuration
//!
//! This module defines how a Zebra printer is addressed and the defaults
//! used when talking to it.
//!
//! ## Addressing
//!
//! | Path given        | Target                          |
//! |-------------------|---------------------------------|
//! | `/dev/usb/lp0`    | local character device (file)   |
//! | `printer`         | TCP `printer:9100`              |
//! | `10.0.0.5:6101`   | TCP `10.0.0.5:6101`             |
//! | `[fe80::1]:9100`  | TCP over IPv6                   |
//! | *(none)*          | USB auto-discovery by vendor ID |
//!
//! ## Usage
//!
//! ```
//! use zebconf::printer::{ConnectionConfig, Target};
//!
//! let config = ConnectionConfig::from_path(Some("printer.local"))?;
//! assert_eq!(
//!     config.target,
//!     Target::Network { host: "printer.local".into(), port: 9100 }
//! );
//! # Ok::<(), zebconf::ZebraError>(())
//! ```

use std::time::Duration;

use crate::error::ZebraError;

/// Default raw printing port on Zebra network interfaces
pub const DEFAULT_PORT: u16 = 9100;

/// USB vendor ID assigned to Zebra Technologies
pub const DEFAULT_VENDOR: u16 = 0x0a5f;

/// Per-read timeout used when waiting for device output
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum number of bytes requested from the transport in one read
pub const MAX_RESPONSE_LEN: usize = 16384;

/// Where a printer lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A local character device (serial port, `/dev/usb/lp0`, ...)
    File(String),

    /// A TCP endpoint
    Network { host: String, port: u16 },

    /// First USB device with the given vendor ID exposing a printer interface
    Usb { vendor_id: u16 },
}

impl Target {
    /// Pick a target from an optional path string.
    ///
    /// A path containing `/` is a local device, any other string is a
    /// `host[:port]` network address, and no path at all means USB.
    pub fn from_path(path: Option<&str>) -> Result<Self, ZebraError> {
        match path {
            None => Ok(Self::Usb {
                vendor_id: DEFAULT_VENDOR,
            }),
            Some(p) if p.contains('/') => Ok(Self::File(p.to_string())),
            Some(p) => {
                let (host, port) = parse_host_port(p)?;
                Ok(Self::Network { host, port })
            }
        }
    }

    /// The path string this target was built from (`None` for USB).
    pub fn path(&self) -> Option<String> {
        match self {
            Self::File(path) => Some(path.clone()),
            Self::Network { host, port } if host.contains(':') => {
                Some(format!("[{}]:{}", host, port))
            }
            Self::Network { host, port } => Some(format!("{}:{}", host, port)),
            Self::Usb { .. } => None,
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::Usb {
            vendor_id: DEFAULT_VENDOR,
        }
    }
}

/// Split `host[:port]`, accepting bracketed IPv6 literals.
fn parse_host_port(s: &str) -> Result<(String, u16), ZebraError> {
    let (host, port) = if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ZebraError::TransportOpen(format!("Invalid address '{}'", s)))?;
        match tail {
            "" => (host, None),
            t => match t.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => {
                    return Err(ZebraError::TransportOpen(format!("Invalid address '{}'", s)));
                }
            },
        }
    } else {
        match s.split_once(':') {
            // A bare IPv6 literal has several colons and no port
            Some((_, tail)) if tail.contains(':') => (s, None),
            Some((host, port)) => (host, Some(port)),
            None => (s, None),
        }
    };

    if host.is_empty() {
        return Err(ZebraError::TransportOpen(format!("Missing host in '{}'", s)));
    }

    let port = match port {
        Some(p) => p
            .parse()
            .map_err(|_| ZebraError::TransportOpen(format!("Invalid port: {}", p)))?,
        None => DEFAULT_PORT,
    };

    Ok((host.to_string(), port))
}

/// # Connection Configuration
///
/// Everything needed to build a transport and drive the protocol engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Where the printer lives
    pub target: Target,

    /// How long a single read waits for the device to say something
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Build a configuration from an optional path, with the default timeout.
    pub fn from_path(path: Option<&str>) -> Result<Self, ZebraError> {
        Ok(Self {
            target: Target::from_path(path)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
