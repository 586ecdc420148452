//! # File Upload Block
//!
//! Files are stored on the printer with a single block that bypasses the
//! line-oriented command framing:
//!
//! ```text
//! ! CISDFCRC16\r\n
//! 0000\r\n                 (CRC field, sent as a literal)
//! <filename>\r\n
//! <length, 8 hex digits>\r\n
//! 0000\r\n                 (checksum field, sent as a literal)
//! <raw content bytes>
//! ```
//!
//! The printer does not acknowledge the block. The CRC/checksum fields are
//! always the literal `0000`; whether firmware verifies them has not been
//! confirmed, so no checksum is computed here.

use crate::error::ZebraError;

/// Leading token of an upload block
pub const UPLOAD_PREAMBLE: &[u8] = b"! CISDFCRC16";

/// Literal placed in the CRC and checksum fields
pub const CRC_PLACEHOLDER: &[u8] = b"0000";

/// # Build an Upload Block
///
/// ```
/// use zebconf::protocol::upload;
///
/// let block = upload::block("LOGO.ZPL", b"^XA^XZ")?;
/// assert_eq!(
///     block,
///     b"! CISDFCRC16\r\n0000\r\nLOGO.ZPL\r\n00000006\r\n0000\r\n^XA^XZ"
/// );
/// # Ok::<(), zebconf::ZebraError>(())
/// ```
///
/// ## Errors
///
/// Returns [`ZebraError::InvalidCommand`] if the filename contains CR or
/// LF, or if the content is longer than the length field can express.
pub fn block(filename: &str, content: &[u8]) -> Result<Vec<u8>, ZebraError> {
    if filename.contains(['\r', '\n']) {
        return Err(ZebraError::InvalidCommand(format!(
            "{:?}: filename contains a line break",
            filename
        )));
    }
    let len = u32::try_from(content.len()).map_err(|_| {
        ZebraError::InvalidCommand(format!("{}: file too large to upload", filename))
    })?;

    let mut data = Vec::with_capacity(UPLOAD_PREAMBLE.len() + filename.len() + 28 + content.len());
    data.extend_from_slice(UPLOAD_PREAMBLE);
    data.extend_from_slice(b"\r\n");
    data.extend_from_slice(CRC_PLACEHOLDER);
    data.extend_from_slice(b"\r\n");
    data.extend_from_slice(filename.as_bytes());
    data.extend_from_slice(format!("\r\n{:08x}\r\n", len).as_bytes());
    data.extend_from_slice(CRC_PLACEHOLDER);
    data.extend_from_slice(b"\r\n");
    data.extend_from_slice(content);
    Ok(data)
}

// ============================================================================
// TESTS
// ============================================================================
