//! # USB Transport
//!
//! Direct access to a printer's USB printer-class interface through its bulk
//! endpoints, without going through the kernel's `usblp` driver.
//!
//! ## Device Selection
//!
//! The first device with the configured vendor ID (Zebra, `0x0a5f`, by
//! default) that exposes an interface of class 7 (printer) is used. Its
//! bulk-IN and bulk-OUT endpoints carry responses and commands.
//!
//! ## Kernel Driver
//!
//! On Linux the kernel usually binds `usblp` to the interface. It is
//! detached before claiming and re-attached on close. "Not supported" and
//! "nothing to detach/already attached" outcomes are ignored; any other
//! failure is an error.
//!
//! ## Timeouts
//!
//! Transfers are driven to completion on a private current-thread tokio
//! runtime. A bulk-IN read that does not complete within the timeout is
//! cancelled and reported as an empty read.

use std::io;
use std::time::Duration;

use nusb::transfer::{EndpointType, RequestBuffer, TransferError};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use super::{Transport, not_open};
use crate::error::ZebraError;

/// USB interface class code for printers
pub const CLASS_PRINTER: u8 = 0x07;

/// Direction bit of an endpoint address (set for IN)
const ENDPOINT_DIR_IN: u8 = 0x80;

/// # USB Printer Transport
#[derive(Debug)]
pub struct UsbTransport {
    vendor_id: u16,
    conn: Option<UsbConnection>,
}

struct UsbConnection {
    device: nusb::Device,
    interface: nusb::Interface,
    number: u8,
    ep_in: u8,
    ep_out: u8,
    detached: bool,
    runtime: Runtime,
}

impl std::fmt::Debug for UsbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbConnection")
            .field("interface", &self.number)
            .field("ep_in", &format_args!("{:#04x}", self.ep_in))
            .field("ep_out", &format_args!("{:#04x}", self.ep_out))
            .finish()
    }
}

impl UsbTransport {
    /// Create a transport that will look for a device with `vendor_id`.
    pub fn new(vendor_id: u16) -> Self {
        Self {
            vendor_id,
            conn: None,
        }
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }
}

impl Transport for UsbTransport {
    fn open(&mut self, _timeout: Duration) -> Result<(), ZebraError> {
        let info = nusb::list_devices()
            .map_err(|e| ZebraError::TransportOpen(format!("USB enumeration failed: {}", e)))?
            .find(|d| {
                d.vendor_id() == self.vendor_id
                    && d.interfaces().any(|i| i.class() == CLASS_PRINTER)
            })
            .ok_or_else(|| ZebraError::TransportOpen("No Zebra printers found".to_string()))?;

        info!(
            "found {:04x}:{:04x} on bus {} addr {}",
            info.vendor_id(),
            info.product_id(),
            info.bus_number(),
            info.device_address()
        );

        let device = info
            .open()
            .map_err(|e| ZebraError::TransportOpen(format!("Failed to open USB device: {}", e)))?;

        let (number, ep_in, ep_out) = find_printer_interface(&device)?;
        debug!(
            "printer interface {} (in {:#04x}, out {:#04x})",
            number, ep_in, ep_out
        );

        let detached = detach_kernel_driver(&device, number)?;

        // The interface is released before re-attaching on failure
        let (interface, runtime) = reattach_on_error(claim(&device, number), detached, || {
            if let Err(e) = attach_kernel_driver(&device, number) {
                debug!("re-attach after failed open: {}", e);
            }
        })?;

        self.conn = Some(UsbConnection {
            device,
            interface,
            number,
            ep_in,
            ep_out,
            detached,
            runtime,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), ZebraError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        let UsbConnection {
            device,
            interface,
            number,
            detached,
            ..
        } = conn;

        // Releases the interface
        drop(interface);

        if detached {
            attach_kernel_driver(&device, number)?;
        }
        debug!("closed USB interface {}", number);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError> {
        let conn = self.conn.as_ref().ok_or_else(not_open)?;
        let transfer = conn.interface.bulk_out(conn.ep_out, data.to_vec());
        conn.runtime
            .block_on(transfer)
            .into_result()
            .map_err(|e| ZebraError::Transport(format!("Bulk write failed: {}", e)))?;
        Ok(())
    }

    fn read(&mut self, size: usize, timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError> {
        let conn = self.conn.as_ref().ok_or_else(not_open)?;
        let transfer = conn.interface.bulk_in(conn.ep_in, RequestBuffer::new(size));

        let completion = conn
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, transfer).await });

        match completion {
            // Dropping the transfer future cancels it
            Err(_) => Ok(Some(Vec::new())),
            Ok(completion) => match completion.into_result() {
                Ok(data) => Ok(Some(data)),
                Err(TransferError::Cancelled) => Ok(Some(Vec::new())),
                Err(e) => Err(ZebraError::Transport(format!("Bulk read failed: {}", e))),
            },
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

/// Claim and reset the interface, and set up the transfer runtime.
fn claim(device: &nusb::Device, number: u8) -> Result<(nusb::Interface, Runtime), ZebraError> {
    let interface = device.claim_interface(number).map_err(|e| {
        ZebraError::TransportOpen(format!("Failed to claim interface {}: {}", number, e))
    })?;

    device
        .reset()
        .map_err(|e| ZebraError::TransportOpen(format!("USB reset failed: {}", e)))?;

    let runtime = Builder::new_current_thread().enable_time().build()?;
    Ok((interface, runtime))
}

/// Give a detached kernel driver back when opening fails part way.
fn reattach_on_error<R>(
    result: Result<R, ZebraError>,
    detached: bool,
    reattach: impl FnOnce(),
) -> Result<R, ZebraError> {
    if result.is_err() && detached {
        reattach();
    }
    result
}

/// Locate the printer-class interface and its bulk endpoint pair.
fn find_printer_interface(device: &nusb::Device) -> Result<(u8, u8, u8), ZebraError> {
    for config in device.configurations() {
        for alt in config.interface_alt_settings() {
            if alt.class() != CLASS_PRINTER {
                continue;
            }

            let bulk = |want_in: bool| {
                alt.endpoints()
                    .filter(|ep| ep.transfer_type() == EndpointType::Bulk)
                    .map(|ep| ep.address())
                    .find(|addr| (addr & ENDPOINT_DIR_IN != 0) == want_in)
            };

            if let (Some(ep_in), Some(ep_out)) = (bulk(true), bulk(false)) {
                return Ok((alt.interface_number(), ep_in, ep_out));
            }
        }
    }

    Err(ZebraError::TransportOpen(
        "No printer interface with bulk endpoints".to_string(),
    ))
}

/// Whether a kernel-driver error means "unsupported" or "already in the
/// requested state" (`already_errno`).
fn is_ignorable(err: &io::Error, already_errno: i32) -> bool {
    err.kind() == io::ErrorKind::Unsupported || err.raw_os_error() == Some(already_errno)
}

/// Detach the kernel driver from `interface`. Returns whether one was detached.
#[cfg(target_os = "linux")]
fn detach_kernel_driver(device: &nusb::Device, interface: u8) -> Result<bool, ZebraError> {
    match device.detach_kernel_driver(interface) {
        Ok(()) => {
            debug!("detached kernel driver from interface {}", interface);
            Ok(true)
        }
        Err(e) if is_ignorable(&e, libc::ENODATA) => {
            debug!("kernel driver not detached: {}", e);
            Ok(false)
        }
        Err(e) => Err(ZebraError::TransportOpen(format!(
            "Failed to detach kernel driver: {}",
            e
        ))),
    }
}

#[cfg(not(target_os = "linux"))]
fn detach_kernel_driver(_device: &nusb::Device, _interface: u8) -> Result<bool, ZebraError> {
    Ok(false)
}

/// Re-attach the kernel driver to `interface`.
#[cfg(target_os = "linux")]
fn attach_kernel_driver(device: &nusb::Device, interface: u8) -> Result<(), ZebraError> {
    match device.attach_kernel_driver(interface) {
        Ok(()) => {
            debug!("re-attached kernel driver to interface {}", interface);
            Ok(())
        }
        Err(e) if is_ignorable(&e, libc::EBUSY) => {
            debug!("kernel driver not re-attached: {}", e);
            Ok(())
        }
        Err(e) => Err(ZebraError::Transport(format!(
            "Failed to re-attach kernel driver: {}",
            e
        ))),
    }
}

#[cfg(not(target_os = "linux"))]
fn attach_kernel_driver(_device: &nusb::Device, _interface: u8) -> Result<(), ZebraError> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
