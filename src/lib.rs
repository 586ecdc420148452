//! # Zebconf - Zebra Printer Configuration Library
//!
//! Zebconf configures Zebra label printers over their SGD ("Set/Get/Do")
//! command protocol. It provides:
//!
//! - **Transport**: local device nodes, raw TCP, and USB bulk endpoints
//! - **Protocol engine**: `getvar`/`setvar`/`do`, file storage, firmware upgrade
//! - **Configuration schema**: typed access to the dotted variable namespace
//! - **Firmware**: validation of firmware archives
//!
//! ## Quick Start
//!
//! ```no_run
//! use zebconf::{ZebraDevice, schema::{ConfigRoot, WifiAuth}};
//!
//! // USB auto-discovery; pass Some("host") or Some("/dev/usb/lp0") otherwise
//! let mut device = ZebraDevice::from_path(None, None)?;
//!
//! device.session(|dev| {
//!     println!("firmware {}", ConfigRoot::new().appl().name().get(dev)?);
//!     dev.wifi("TestNet", Some("hunter2"), WifiAuth::WpaPsk, Some("US"))?;
//!     dev.reset()
//! })?;
//!
//! # Ok::<(), zebconf::error::ZebraError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Byte-stream backends |
//! | [`protocol`] | SGD command and upload framing |
//! | [`device`] | Protocol engine |
//! | [`schema`] | Typed configuration variables |
//! | [`firmware`] | Firmware archives |
//! | [`printer`] | Addressing and connection defaults |
//! | [`error`] | Error types |

pub mod device;
pub mod error;
pub mod firmware;
pub mod printer;
pub mod protocol;
pub mod schema;
pub mod transport;

// Re-exports for convenience
pub use device::ZebraDevice;
pub use error::ZebraError;
pub use firmware::Firmware;
pub use printer::ConnectionConfig;
