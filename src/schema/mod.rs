//! # Configuration Schema
//!
//! A typed view over the printer's flat, dotted variable namespace. The view
//! owns no state: each read is a live `getvar` and each write a `setvar`
//! through a [`VarStore`] (normally a [`ZebraDevice`](crate::ZebraDevice)).
//!
//! ## Module Structure
//!
//! - [`codec`]: string ⇄ typed value conversions
//! - [`field`]: typed leaves and namespace prefixes
//! - [`tree`]: the printer's variable tree
//! - [`wpa`]: WPA-PSK derivation and authentication schemes
//!
//! ## Usage Example
//!
//! ```
//! use std::time::Duration;
//! use zebconf::ZebraDevice;
//! use zebconf::schema::ConfigRoot;
//! use zebconf::transport::SimulatedPrinter;
//!
//! let printer = SimulatedPrinter::new().with_var("ip.dhcp.enable", "on");
//! let mut device = ZebraDevice::new(printer, Duration::from_millis(10));
//! let config = ConfigRoot::new();
//!
//! device.session(|dev| {
//!     assert!(config.ip().dhcp().enable().get(dev)?);
//!     config.device().friendly_name().set(dev, "Shipping")?;
//!     Ok(())
//! })?;
//! # Ok::<(), zebconf::ZebraError>(())
//! ```

pub mod codec;
pub mod field;
pub mod tree;
pub mod wpa;

pub use codec::{Codec, Integer, Ipv4, OnOff, Text};
pub use field::{Block, Field, VarStore};
pub use tree::{
    ApplConfig, ConfigRoot, DeviceConfig, IpConfig, IpDhcpConfig, WlanConfig, WlanIpConfig,
    WlanWpaConfig,
};
pub use wpa::{WifiAuth, derive_psk};
