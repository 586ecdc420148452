//! # Firmware Packages
//!
//! Zebra distributes firmware as a zip archive holding a single `.zpl`
//! payload. The payload is sent to the printer verbatim; its file name
//! without the extension is the firmware version (e.g. `V84.20.18Z.zpl`).
//!
//! ```no_run
//! use zebconf::Firmware;
//!
//! let firmware = Firmware::open("V84.20.18Z.zip")?;
//! println!("version {} ({} bytes)", firmware.version(), firmware.data().len());
//! # Ok::<(), zebconf::ZebraError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::ZebraError;

/// Extension (compared case-insensitively) of the firmware payload
pub const PAYLOAD_EXTENSION: &str = "zpl";

/// A validated firmware package.
#[derive(Debug, Clone)]
pub struct Firmware {
    payload_name: String,
    version: String,
    data: Vec<u8>,
}

impl Firmware {
    /// Open and validate a firmware archive on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ZebraError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ZebraError::BadFirmware(format!("Cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Validate a firmware archive from any seekable reader.
    ///
    /// ## Errors
    ///
    /// [`ZebraError::BadFirmware`] if the archive is unreadable or does not
    /// hold exactly one `.zpl` entry.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, ZebraError> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| ZebraError::BadFirmware(format!("Not a firmware archive: {}", e)))?;

        let payloads: Vec<String> = archive
            .file_names()
            .filter(|name| is_payload(name))
            .map(str::to_string)
            .collect();
        for name in &payloads {
            debug!("found {}", name);
        }

        let payload_name = match payloads.as_slice() {
            [] => return Err(ZebraError::BadFirmware("No .zpl files in firmware".to_string())),
            [single] => single.clone(),
            _ => {
                return Err(ZebraError::BadFirmware(
                    "Multiple .zpl files in firmware".to_string(),
                ));
            }
        };

        let mut data = Vec::new();
        archive
            .by_name(&payload_name)
            .map_err(|e| ZebraError::BadFirmware(format!("{}: {}", payload_name, e)))?
            .read_to_end(&mut data)?;

        let version = Path::new(&payload_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("version {}", version);

        Ok(Self {
            payload_name,
            version,
            data,
        })
    }

    /// Firmware version, from the payload's file name
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Archive path of the payload entry
    pub fn payload_name(&self) -> &str {
        &self.payload_name
    }

    /// Payload bytes, sent to the printer as-is
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl AsRef<[u8]> for Firmware {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

fn is_payload(name: &str) -> bool {
    !name.ends_with('/')
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PAYLOAD_EXTENSION))
}

// ============================================================================
// TESTS
// ============================================================================
