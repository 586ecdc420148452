//! # TCP Transport
//!
//! Raw socket connection to a printer's network interface. Zebra printers
//! accept SGD commands on the same port as label data (9100 unless
//! configured otherwise).

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use tracing::{debug, info};

use super::{Transport, not_open, wait_readable};
use crate::error::ZebraError;

/// # TCP Printer Transport
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use zebconf::transport::{NetworkTransport, Transport};
///
/// let mut transport = NetworkTransport::new("192.168.1.50", 9100);
/// transport.open(Duration::from_secs(2))?;
/// transport.write(b"! U1 do \"device.reset\" \"\"\r\n")?;
/// transport.close()?;
///
/// # Ok::<(), zebconf::ZebraError>(())
/// ```
#[derive(Debug)]
pub struct NetworkTransport {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl NetworkTransport {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            stream: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Transport for NetworkTransport {
    fn open(&mut self, timeout: Duration) -> Result<(), ZebraError> {
        let addrs = (self.host.as_str(), self.port).to_socket_addrs().map_err(|e| {
            ZebraError::TransportOpen(format!("Cannot resolve {}: {}", self.host, e))
        })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    info!("connected to {}", addr);
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => {
                    debug!("connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(ZebraError::TransportOpen(match last_err {
            Some(e) => format!("Cannot connect to {}:{}: {}", self.host, self.port, e),
            None => format!("No addresses for {}", self.host),
        }))
    }

    fn close(&mut self) -> Result<(), ZebraError> {
        if let Some(stream) = self.stream.take() {
            // The peer may already have gone away
            let _ = stream.shutdown(Shutdown::Both);
            debug!("closed {}:{}", self.host, self.port);
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError> {
        let stream = self.stream.as_mut().ok_or_else(not_open)?;
        stream
            .write_all(data)
            .map_err(|e| ZebraError::Transport(format!("Write failed: {}", e)))
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError> {
        let stream = self.stream.as_mut().ok_or_else(not_open)?;

        let ready = wait_readable(stream.as_raw_fd(), timeout)
            .map_err(|e| ZebraError::Transport(format!("Poll failed: {}", e)))?;
        if !ready {
            return Ok(None);
        }

        let mut buf = vec![0u8; size];
        let n = stream
            .read(&mut buf)
            .map_err(|e| ZebraError::Transport(format!("Read failed: {}", e)))?;
        buf.truncate(n);
        Ok(Some(buf))
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================
