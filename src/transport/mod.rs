//! # Printer Transport Layer
//!
//! This module provides the byte-stream backends used to talk to printers.
//! Every backend implements [`Transport`]: open, close, write, and a read
//! that gives up quietly once the device has been silent for a while.
//!
//! ## Available Transports
//!
//! - [`file`]: local character devices (serial ports, `/dev/usb/lp0`)
//! - [`network`]: raw TCP, port 9100 by default
//! - [`usb`]: USB printer-class interface, bulk endpoints
//! - [`simulated`]: in-memory printer for tests and dry runs
//!
//! [`for_target`] picks the backend for a [`Target`].

pub mod file;
pub mod network;
pub mod simulated;
pub mod usb;

pub use file::FileTransport;
pub use network::NetworkTransport;
pub use simulated::SimulatedPrinter;
pub use usb::UsbTransport;

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use crate::error::ZebraError;
use crate::printer::Target;

/// A bidirectional byte stream to a printer.
///
/// Reads and writes are only valid between [`open`](Transport::open) and
/// [`close`](Transport::close).
pub trait Transport {
    /// Open the connection. `timeout` bounds connection setup where the
    /// backend supports it.
    fn open(&mut self, timeout: Duration) -> Result<(), ZebraError>;

    /// Close the connection and release its resources.
    ///
    /// Closing a transport that is not open does nothing.
    fn close(&mut self) -> Result<(), ZebraError>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError>;

    /// Read up to `size` bytes, waiting at most `timeout` for the first one.
    ///
    /// Returns `Ok(None)` or an empty buffer when nothing arrived in time.
    /// Silence is not an error at this layer.
    fn read(&mut self, size: usize, timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError>;

    /// Whether the transport is currently open.
    fn is_open(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self, timeout: Duration) -> Result<(), ZebraError> {
        (**self).open(timeout)
    }

    fn close(&mut self) -> Result<(), ZebraError> {
        (**self).close()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError> {
        (**self).write(data)
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError> {
        (**self).read(size, timeout)
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Build the (unopened) transport for a target.
pub fn for_target(target: &Target) -> Box<dyn Transport> {
    match target {
        Target::File(path) => Box::new(FileTransport::new(path)),
        Target::Network { host, port } => Box::new(NetworkTransport::new(host, *port)),
        Target::Usb { vendor_id } => Box::new(UsbTransport::new(*vendor_id)),
    }
}

/// Error returned when using a transport that is not open.
pub(crate) fn not_open() -> ZebraError {
    ZebraError::Transport("Connection is not open".to_string())
}

/// Wait until `fd` is readable or `timeout` expires.
///
/// Returns `Ok(false)` on timeout. Hang-up and error conditions count as
/// readable so that the following read can report them.
pub(crate) fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = poll_timeout_ms(timeout);

    loop {
        let result = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(result > 0);
    }
}

/// `poll(2)` timeout in milliseconds, rounded up so a sub-millisecond wait
/// still blocks.
fn poll_timeout_ms(timeout: Duration) -> libc::c_int {
    timeout
        .as_micros()
        .div_ceil(1000)
        .min(libc::c_int::MAX as u128) as libc::c_int
}

// ============================================================================
// TESTS
// ============================================================================
