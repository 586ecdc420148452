//! # Printer Module
//!
//! This module describes how to reach a printer.
//!
//! ## Modules
//!
//! - [`config`]: Addressing and connection defaults

pub mod config;

pub use config::{ConnectionConfig, Target};
