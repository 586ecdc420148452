//! # SGD Command Lines
//!
//! Every command is a single ASCII line:
//!
//! ```text
//! ! U1 <verb> "<arg1>" ["<arg2>"]\r\n
//! ```
//!
//! | Verb     | Arguments        | Response              |
//! |----------|------------------|-----------------------|
//! | `getvar` | name             | `"<value>"` or `"?"`  |
//! | `setvar` | name, value      | none                  |
//! | `do`     | action, param    | depends on the action |

use crate::error::ZebraError;

/// Command prefix shared by all SGD lines
pub const PREFIX: &[u8] = b"! U1";

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// `getvar` response sent for names the device does not recognise
pub const UNKNOWN_VALUE: &str = "\"?\"";

/// # Get Variable
///
/// ```
/// use zebconf::protocol::commands;
///
/// let frame = commands::getvar("device.friendly_name")?;
/// assert_eq!(frame, b"! U1 getvar \"device.friendly_name\"\r\n");
/// # Ok::<(), zebconf::ZebraError>(())
/// ```
pub fn getvar(name: &str) -> Result<Vec<u8>, ZebraError> {
    frame("getvar", &[name])
}

/// # Set Variable
///
/// The device sends no acknowledgement.
pub fn setvar(name: &str, value: &str) -> Result<Vec<u8>, ZebraError> {
    frame("setvar", &[name, value])
}

/// # Execute Action (`do`)
///
/// `param` is sent even when empty, as `""`.
pub fn action(action: &str, param: &str) -> Result<Vec<u8>, ZebraError> {
    frame("do", &[action, param])
}

fn frame(verb: &str, args: &[&str]) -> Result<Vec<u8>, ZebraError> {
    let mut data = Vec::with_capacity(PREFIX.len() + verb.len() + 32);
    data.extend_from_slice(PREFIX);
    data.push(b' ');
    data.extend_from_slice(verb.as_bytes());
    for arg in args {
        check_arg(arg)?;
        data.extend_from_slice(b" \"");
        data.extend_from_slice(arg.as_bytes());
        data.push(b'"');
    }
    data.extend_from_slice(CRLF);
    Ok(data)
}

/// Reject arguments that would terminate the quoted field or the line early.
pub(crate) fn check_arg(arg: &str) -> Result<(), ZebraError> {
    if let Some(c) = arg.chars().find(|c| matches!(c, '"' | '\r' | '\n')) {
        return Err(ZebraError::InvalidCommand(format!(
            "{:?} contains {:?}, which cannot be sent",
            arg, c
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
