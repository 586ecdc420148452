//! # Zebra Printer Device
//!
//! The protocol engine: frames SGD commands onto a [`Transport`], reads
//! device output back, and builds the file and configuration operations on
//! top of `getvar`, `setvar` and `do`.
//!
//! ## Reading Responses
//!
//! Device output has no length prefix or terminator. A read keeps pulling
//! up to [`MAX_RESPONSE_LEN`] bytes at a time until either the whole
//! accumulated buffer matches the expected pattern, or one wait of
//! `timeout` passes with no new bytes. The timeout applies to each wait,
//! not to the exchange as a whole: a device that keeps trickling bytes
//! keeps the read going.
//!
//! Getting nothing at all is [`ZebraError::Timeout`]. Getting something
//! that never matched is returned as-is.
//!
//! ## Sessions
//!
//! One command/response exchange is in flight at a time; the protocol has
//! no request IDs. Callers sharing a device must serialise access.
//! [`ZebraDevice::session`] opens the transport, runs a closure, and
//! always closes it again.
//!
//! ```no_run
//! use zebconf::{ZebraDevice, printer::ConnectionConfig};
//!
//! let config = ConnectionConfig::from_path(Some("192.168.1.50"))?;
//! let mut device = ZebraDevice::from_config(&config);
//! let name = device.session(|dev| dev.getvar("device.friendly_name"))?;
//! println!("{}", name);
//! # Ok::<(), zebconf::ZebraError>(())
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ZebraError;
use crate::firmware::Firmware;
use crate::printer::ConnectionConfig;
use crate::printer::config::{DEFAULT_TIMEOUT, MAX_RESPONSE_LEN};
use crate::protocol::commands::{self, UNKNOWN_VALUE};
use crate::protocol::{Expect, upload};
use crate::schema::{ConfigRoot, VarStore, WifiAuth};
use crate::transport::{self, Transport};

// ============================================================================
// WIRE LOGGING
// ============================================================================

/// Observer for bytes crossing the wire.
pub trait WireLog {
    /// Bytes about to be written
    fn tx(&self, data: &[u8], printable: bool);

    /// Bytes just read
    fn rx(&self, data: &[u8], printable: bool);
}

/// [`WireLog`] that emits `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWireLog;

impl WireLog for TracingWireLog {
    fn tx(&self, data: &[u8], printable: bool) {
        debug!("tx: {}", render(data, printable));
    }

    fn rx(&self, data: &[u8], printable: bool) {
        debug!("rx: {}", render(data, printable));
    }
}

/// Render traffic for a log line: trimmed text, or lowercase hex for binary.
pub fn render(data: &[u8], printable: bool) -> String {
    if printable {
        String::from_utf8_lossy(data).trim().to_string()
    } else {
        data.iter().fold(String::with_capacity(data.len() * 2), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
    }
}

// ============================================================================
// DEVICE
// ============================================================================

/// # Zebra Printer
pub struct ZebraDevice<T: Transport = Box<dyn Transport>> {
    transport: T,
    timeout: Duration,
    wire_log: Box<dyn WireLog>,
}

impl ZebraDevice {
    /// Build a device for a configured target. Nothing is opened yet.
    pub fn from_config(config: &ConnectionConfig) -> Self {
        ZebraDevice::new(transport::for_target(&config.target), config.timeout)
    }

    /// Build a device from an optional path (see [`Target::from_path`](crate::printer::Target::from_path)).
    pub fn from_path(path: Option<&str>, timeout: Option<Duration>) -> Result<Self, ZebraError> {
        let config = ConnectionConfig::from_path(path)?
            .with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));
        Ok(Self::from_config(&config))
    }
}

impl<T: Transport> ZebraDevice<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            wire_log: Box::new(TracingWireLog),
        }
    }

    /// Replace the wire logger.
    pub fn with_wire_log<L: WireLog + 'static>(mut self, wire_log: L) -> Self {
        self.wire_log = Box::new(wire_log);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn open(&mut self) -> Result<(), ZebraError> {
        self.transport.open(self.timeout)
    }

    pub fn close(&mut self) -> Result<(), ZebraError> {
        self.transport.close()
    }

    /// Run `f` with the device open, closing it afterwards on every path.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn session<R, F>(&mut self, f: F) -> Result<R, ZebraError>
    where
        F: FnOnce(&mut Self) -> Result<R, ZebraError>,
    {
        self.open()?;
        let result = f(self);
        let closed = self.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    // ------------------------------------------------------------------------
    // Raw I/O
    // ------------------------------------------------------------------------

    /// Write raw bytes. `printable` selects text or hex wire logging.
    pub fn write(&mut self, data: &[u8], printable: bool) -> Result<(), ZebraError> {
        self.wire_log.tx(data, printable);
        self.transport.write(data)
    }

    /// Read until the buffer matches `expect`, or until the device goes quiet.
    ///
    /// ## Errors
    ///
    /// [`ZebraError::Timeout`] if no bytes arrived at all.
    pub fn read(&mut self, expect: Option<&Expect>, printable: bool) -> Result<Vec<u8>, ZebraError> {
        let mut data = Vec::new();
        loop {
            let frag = match self.transport.read(MAX_RESPONSE_LEN, self.timeout)? {
                Some(frag) if !frag.is_empty() => frag,
                _ => break,
            };
            self.wire_log.rx(&frag, printable);
            data.extend_from_slice(&frag);
            if expect.is_some_and(|e| e.matches(&data)) {
                break;
            }
        }
        if data.is_empty() {
            return Err(ZebraError::Timeout);
        }
        Ok(data)
    }

    // ------------------------------------------------------------------------
    // SGD commands
    // ------------------------------------------------------------------------

    /// Execute an action. Any output is left for a following [`read`](Self::read).
    pub fn action(&mut self, action: &str, param: &str) -> Result<(), ZebraError> {
        let frame = commands::action(action, param)?;
        self.write(&frame, true)
    }

    /// Set a variable. The device does not acknowledge.
    pub fn setvar(&mut self, name: &str, value: &str) -> Result<(), ZebraError> {
        let frame = commands::setvar(name, value)?;
        self.write(&frame, true)
    }

    /// Get a variable's value, without its quotes.
    ///
    /// ## Errors
    ///
    /// [`ZebraError::UnknownVariable`] if the device answers `"?"`.
    pub fn getvar(&mut self, name: &str) -> Result<String, ZebraError> {
        let frame = commands::getvar(name)?;
        self.write(&frame, true)?;
        let raw = self.read(Some(Expect::quoted()), true)?;
        let value = String::from_utf8_lossy(&raw);
        if value == UNKNOWN_VALUE {
            return Err(ZebraError::UnknownVariable(name.to_string()));
        }
        Ok(value.trim_matches('"').to_string())
    }

    // ------------------------------------------------------------------------
    // Device and file operations
    // ------------------------------------------------------------------------

    pub fn reset(&mut self) -> Result<(), ZebraError> {
        self.action("device.reset", "")
    }

    /// Restore defaults for one settings category (`wlan`, `ip`, ...).
    pub fn restore_defaults(&mut self, category: &str) -> Result<(), ZebraError> {
        self.action("device.restore_defaults", category)
    }

    /// Directory listing of on-device storage.
    pub fn list(&mut self) -> Result<String, ZebraError> {
        self.action("file.dir", "")?;
        let raw = self.read(None, true)?;
        Ok(String::from_utf8_lossy(&raw).trim_matches('"').to_string())
    }

    pub fn delete(&mut self, filename: &str) -> Result<(), ZebraError> {
        self.action("file.delete", filename)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), ZebraError> {
        self.action("file.rename", &format!("{} {}", old, new))
    }

    /// Fetch a stored file's contents.
    pub fn download(&mut self, filename: &str) -> Result<Vec<u8>, ZebraError> {
        self.action("file.type", filename)?;
        self.read(None, false)
    }

    /// Store a file on the device. Nothing is read back.
    pub fn upload(&mut self, filename: &str, content: &[u8]) -> Result<(), ZebraError> {
        let block = upload::block(filename, content)?;
        self.write(&block, false)
    }

    /// Send a firmware payload. The printer takes it from there; nothing is
    /// read back.
    pub fn upgrade(&mut self, firmware: &Firmware) -> Result<(), ZebraError> {
        info!(
            "sending firmware {} ({} bytes)",
            firmware.version(),
            firmware.data().len()
        );
        self.write(firmware.data(), false)
    }

    /// Provision WiFi: restore `wlan` defaults, set the ESSID and optional
    /// country code, then configure authentication.
    ///
    /// ## Errors
    ///
    /// [`ZebraError::Value`] if WPA-PSK is requested without a passphrase.
    pub fn wifi(
        &mut self,
        essid: &str,
        passphrase: Option<&str>,
        auth: WifiAuth,
        country: Option<&str>,
    ) -> Result<(), ZebraError> {
        let wlan = ConfigRoot::new().wlan();
        let passphrase = match auth {
            WifiAuth::WpaPsk => passphrase.ok_or_else(|| {
                ZebraError::Value("WPA-PSK requires a passphrase".to_string())
            })?,
        };

        self.restore_defaults("wlan")?;
        wlan.essid().set(self, essid)?;
        if let Some(country) = country {
            wlan.country_code().set(self, country)?;
        }

        wlan.wpa().set_psk(self, essid, passphrase)
    }
}

impl<T: Transport> VarStore for ZebraDevice<T> {
    fn getvar(&mut self, name: &str) -> Result<String, ZebraError> {
        ZebraDevice::getvar(self, name)
    }

    fn setvar(&mut self, name: &str, value: &str) -> Result<(), ZebraError> {
        ZebraDevice::setvar(self, name, value)
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for ZebraDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZebraDevice")
            .field("transport", &self.transport)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
