//! # Character Device Transport
//!
//! Talks to a printer through a local device node: a USB printer-class
//! device (`/dev/usb/lp0`), a serial port, or anything else that behaves
//! like a bidirectional byte stream.
//!
//! ## TTY Configuration
//!
//! When the node is a terminal (a serial port), the line discipline is
//! switched off so responses and binary uploads pass through byte for byte.
//! See `configure_tty_raw`. Other nodes are used as-is.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::{Transport, not_open, wait_readable};
use crate::error::ZebraError;

/// # Character Device Transport
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use zebconf::transport::{FileTransport, Transport};
///
/// let mut transport = FileTransport::new("/dev/usb/lp0");
/// transport.open(Duration::from_secs(2))?;
/// transport.write(b"! U1 getvar \"device.friendly_name\"\r\n")?;
/// let reply = transport.read(16384, Duration::from_secs(2))?;
/// transport.close()?;
///
/// # Ok::<(), zebconf::ZebraError>(())
/// ```
#[derive(Debug)]
pub struct FileTransport {
    path: PathBuf,
    file: Option<File>,
}

impl FileTransport {
    /// Create a transport for the device node at `path`. Nothing is opened yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    /// Device node path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for FileTransport {
    fn open(&mut self, _timeout: Duration) -> Result<(), ZebraError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&self.path)
            .map_err(|e| {
                ZebraError::TransportOpen(format!("Failed to open {}: {}", self.path.display(), e))
            })?;

        let fd = file.as_raw_fd();
        if unsafe { libc::isatty(fd) } == 1 {
            configure_tty_raw(fd)?;
        }

        debug!("opened {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ZebraError> {
        if self.file.take().is_some() {
            debug!("closed {}", self.path.display());
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError> {
        let file = self.file.as_mut().ok_or_else(not_open)?;
        file.write_all(data)
            .map_err(|e| ZebraError::Transport(format!("Write failed: {}", e)))?;
        file.flush()
            .map_err(|e| ZebraError::Transport(format!("Flush failed: {}", e)))
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError> {
        let file = self.file.as_mut().ok_or_else(not_open)?;

        let ready = wait_readable(file.as_raw_fd(), timeout)
            .map_err(|e| ZebraError::Transport(format!("Poll failed: {}", e)))?;
        if !ready {
            return Ok(None);
        }

        let mut buf = vec![0u8; size];
        let n = file
            .read(&mut buf)
            .map_err(|e| ZebraError::Transport(format!("Read failed: {}", e)))?;
        buf.truncate(n);
        Ok(Some(buf))
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

/// Put a serial port into raw 8N1 mode with poll-driven reads.
///
/// `cfmakeraw` clears every flag that would rewrite SGD traffic on a
/// serial line:
///
/// | Flag | Effect on the printer link if left set |
/// |------|----------------------------------------|
/// | ICRNL, INLCR, IGNCR | the `\r\n` ending responses gets rewritten |
/// | IXON, IXOFF | 0x11/0x13 in firmware or stored files stall the line |
/// | ISTRIP, PARENB | the high bit of codepage text is lost |
/// | ICANON | nothing is delivered until a newline, but quoted replies have none |
/// | ECHO, ISIG | replies are echoed back to the printer; 0x03 raises SIGINT |
/// | OPOST | `\n` in upload blocks is expanded to `\r\n` |
///
/// VMIN and VTIME are zeroed since waiting is done with `poll(2)`.
fn configure_tty_raw(fd: i32) -> Result<(), ZebraError> {
    let tty_error = |call: &str| {
        ZebraError::TransportOpen(format!("{} failed: {}", call, io::Error::last_os_error()))
    };

    let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(tty_error("tcgetattr"));
    }
    let mut termios = unsafe { termios.assume_init() };

    unsafe { libc::cfmakeraw(&mut termios) };
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 0;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(tty_error("tcsetattr"));
    }
    debug!("serial line set to raw mode");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
