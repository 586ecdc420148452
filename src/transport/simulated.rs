//! # Simulated Printer
//!
//! An in-memory [`Transport`] that understands enough SGD to stand in for a
//! real printer: it keeps a variable table and a small file store, answers
//! `getvar` and `file.dir`/`file.type`, and records everything written to it.
//!
//! ```
//! use zebconf::ZebraDevice;
//! use zebconf::transport::SimulatedPrinter;
//!
//! let mut device = ZebraDevice::new(SimulatedPrinter::new(), std::time::Duration::from_millis(10));
//! device.session(|dev| {
//!     dev.setvar("wlan.essid", "TestNet")?;
//!     assert_eq!(dev.getvar("wlan.essid")?, "TestNet");
//!     Ok(())
//! })?;
//! # Ok::<(), zebconf::ZebraError>(())
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use super::{Transport, not_open};
use crate::error::ZebraError;
use crate::protocol::upload::UPLOAD_PREAMBLE;

/// How the simulated printer answers `getvar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Answer with the stored value, or `"?"` for names never set
    #[default]
    Echo,

    /// Answer `"?"` to everything
    AlwaysUnknown,

    /// Never answer anything
    Silent,
}

/// # Simulated Printer
#[derive(Debug, Default)]
pub struct SimulatedPrinter {
    behavior: Behavior,
    open: bool,
    opens: usize,
    closes: usize,
    vars: BTreeMap<String, String>,
    files: BTreeMap<String, Vec<u8>>,
    actions: Vec<(String, String)>,
    written: Vec<Vec<u8>>,
    payloads: Vec<Vec<u8>>,
    pending: VecDeque<u8>,
    chunk_size: Option<usize>,
}

impl SimulatedPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change how `getvar` is answered.
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Preload a variable.
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Preload a stored file.
    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.insert(name.to_string(), content.to_vec());
        self
    }

    /// Deliver output in reads of at most `size` bytes.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    /// Queue unsolicited output, delivered by the next reads.
    pub fn push_response(&mut self, data: &[u8]) {
        self.pending.extend(data);
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// `do` commands received, as `(action, parameter)` pairs
    pub fn actions(&self) -> &[(String, String)] {
        &self.actions
    }

    /// Every buffer passed to `write`, in order
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Writes that were neither SGD commands nor file uploads (firmware)
    pub fn payloads(&self) -> &[Vec<u8>] {
        &self.payloads
    }

    pub fn open_count(&self) -> usize {
        self.opens
    }

    pub fn close_count(&self) -> usize {
        self.closes
    }

    fn respond(&mut self, data: &[u8]) {
        if self.behavior != Behavior::Silent {
            self.pending.extend(data);
        }
    }

    fn handle_command(&mut self, verb: &str, args: &[String]) {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        match verb {
            "getvar" => {
                let value = match self.behavior {
                    Behavior::AlwaysUnknown => None,
                    _ => self.vars.get(&arg(0)).cloned(),
                };
                let reply = format!("\"{}\"", value.as_deref().unwrap_or("?"));
                self.respond(reply.as_bytes());
            }
            "setvar" => {
                self.vars.insert(arg(0), arg(1));
            }
            "do" => {
                let (action, param) = (arg(0), arg(1));
                self.handle_action(&action, &param);
                self.actions.push((action, param));
            }
            _ => {}
        }
    }

    fn handle_action(&mut self, action: &str, param: &str) {
        match action {
            "device.restore_defaults" => {
                let prefix = format!("{}.", param);
                self.vars.retain(|name, _| !name.starts_with(&prefix));
            }
            "file.dir" => {
                let mut listing = String::from("\r\n- DIR E:*.*\r\n");
                for (name, content) in &self.files {
                    listing.push_str(&format!("* E:{} {}\r\n", name, content.len()));
                }
                let reply = format!("\"{}\"", listing);
                self.respond(reply.as_bytes());
            }
            "file.type" => {
                if let Some(content) = self.files.get(param).cloned() {
                    self.respond(&content);
                }
            }
            "file.delete" => {
                self.files.remove(param);
            }
            "file.rename" => {
                if let Some((old, new)) = param.split_once(' ') {
                    if let Some(content) = self.files.remove(old) {
                        self.files.insert(new.to_string(), content);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_upload(&mut self, mut rest: &[u8]) -> bool {
        let mut header = Vec::with_capacity(4);
        for _ in 0..4 {
            match take_line(&mut rest) {
                Some(line) => header.push(line),
                None => return false,
            }
        }
        let name = String::from_utf8_lossy(header[1]).into_owned();
        let Some(len) = std::str::from_utf8(header[2])
            .ok()
            .and_then(|s| usize::from_str_radix(s, 16).ok())
        else {
            return false;
        };
        if rest.len() != len {
            return false;
        }
        self.files.insert(name, rest.to_vec());
        true
    }
}

/// Split off the next CR-LF terminated line.
fn take_line<'a>(data: &mut &'a [u8]) -> Option<&'a [u8]> {
    let pos = data.windows(2).position(|w| w == b"\r\n")?;
    let line = &data[..pos];
    *data = &data[pos + 2..];
    Some(line)
}

/// Parse `! U1 <verb> "<arg>" ...\r\n` into the verb and its arguments.
fn parse_command(data: &[u8]) -> Option<(String, Vec<String>)> {
    let text = std::str::from_utf8(data).ok()?;
    let body = text.strip_prefix("! U1 ")?.strip_suffix("\r\n")?;
    let (verb, rest) = body.split_once(' ').unwrap_or((body, ""));
    let args = rest
        .split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect();
    Some((verb.to_string(), args))
}

impl Transport for SimulatedPrinter {
    fn open(&mut self, _timeout: Duration) -> Result<(), ZebraError> {
        self.open = true;
        self.opens += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ZebraError> {
        if self.open {
            self.open = false;
            self.closes += 1;
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ZebraError> {
        if !self.open {
            return Err(not_open());
        }
        self.written.push(data.to_vec());

        let handled = match data.strip_prefix(UPLOAD_PREAMBLE) {
            Some(rest) => rest
                .strip_prefix(b"\r\n")
                .is_some_and(|rest| self.handle_upload(rest)),
            None => match parse_command(data) {
                Some((verb, args)) => {
                    self.handle_command(&verb, &args);
                    true
                }
                None => false,
            },
        };
        if !handled {
            self.payloads.push(data.to_vec());
        }
        Ok(())
    }

    fn read(&mut self, size: usize, _timeout: Duration) -> Result<Option<Vec<u8>>, ZebraError> {
        if !self.open {
            return Err(not_open());
        }
        if self.pending.is_empty() {
            return Ok(None);
        }
        let n = size
            .min(self.chunk_size.unwrap_or(usize::MAX))
            .min(self.pending.len());
        Ok(Some(self.pending.drain(..n).collect()))
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

// ============================================================================
// TESTS
// ============================================================================
