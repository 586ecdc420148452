//! # Value Codecs
//!
//! Conversions between a variable's on-wire string and its typed value.

use std::net::Ipv4Addr;

use crate::error::ZebraError;

/// Conversion between the device's string representation and a typed value.
pub trait Codec {
    type Value;

    /// Parse a raw value read from variable `name`.
    fn decode(name: &str, raw: &str) -> Result<Self::Value, ZebraError>;

    /// Render a value for the wire.
    fn encode(value: &Self::Value) -> String;
}

/// Plain string, passed through unchanged
#[derive(Debug, Clone, Copy)]
pub struct Text;

/// Decimal integer
#[derive(Debug, Clone, Copy)]
pub struct Integer;

/// `on` / `off` switch
#[derive(Debug, Clone, Copy)]
pub struct OnOff;

/// Dotted-quad IPv4 address
#[derive(Debug, Clone, Copy)]
pub struct Ipv4;

fn invalid(name: &str, raw: &str) -> ZebraError {
    ZebraError::Value(format!("{}: invalid value '{}'", name, raw))
}

impl Codec for Text {
    type Value = String;

    fn decode(_name: &str, raw: &str) -> Result<String, ZebraError> {
        Ok(raw.to_string())
    }

    fn encode(value: &String) -> String {
        value.clone()
    }
}

impl Codec for Integer {
    type Value = i64;

    fn decode(name: &str, raw: &str) -> Result<i64, ZebraError> {
        raw.trim().parse().map_err(|_| invalid(name, raw))
    }

    fn encode(value: &i64) -> String {
        value.to_string()
    }
}

impl Codec for OnOff {
    type Value = bool;

    fn decode(name: &str, raw: &str) -> Result<bool, ZebraError> {
        match raw {
            "on" => Ok(true),
            "off" => Ok(false),
            _ => Err(invalid(name, raw)),
        }
    }

    fn encode(value: &bool) -> String {
        String::from(if *value { "on" } else { "off" })
    }
}

impl Codec for Ipv4 {
    type Value = Ipv4Addr;

    fn decode(name: &str, raw: &str) -> Result<Ipv4Addr, ZebraError> {
        raw.parse().map_err(|_| invalid(name, raw))
    }

    fn encode(value: &Ipv4Addr) -> String {
        value.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
