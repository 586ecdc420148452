//! # SGD Protocol Implementation
//!
//! This module provides the byte-level framing for Zebra's Set/Get/Do
//! command protocol.
//!
//! ## Module Structure
//!
//! - [`commands`]: `getvar`, `setvar` and `do` command lines
//! - [`upload`]: the file upload block
//! - [`expect`]: response patterns for the read loop
//!
//! ## Usage Example
//!
//! ```
//! use zebconf::protocol::commands;
//!
//! let frame = commands::setvar("wlan.essid", "TestNet")?;
//! assert_eq!(frame, b"! U1 setvar \"wlan.essid\" \"TestNet\"\r\n");
//! # Ok::<(), zebconf::ZebraError>(())
//! ```
//!
//! ## Framing
//!
//! SGD lines carry no length field and the wire has no escape mechanism:
//! arguments are wrapped in double quotes verbatim. Arguments that would
//! break the framing (a `"`, CR or LF) are rejected before anything is sent.

pub mod commands;
pub mod expect;
pub mod upload;

pub use expect::Expect;
