//! The recording line format.
//!
//! Capture tools emit one line per fact, and the whole replay ecosystem
//! speaks this text format:
//!
//! ```text
//! R: 52 05 01 09 02 a1 01 …      report descriptor (length, then hex bytes)
//! N: PixArt USB Optical Mouse    device name
//! I: 3 093a 2510                 bus, vendor ID, product ID
//! E: 0.000000 3 01 0a f6         event: seconds.microseconds, length, bytes
//! # anything                     comment, passed through
//! ```
//!
//! [`Line::parse`] classifies a single line; [`Recording`] loads a whole
//! file into structured form; [`ReplaySession`] streams lines through and
//! reproduces the decoded output the replay tools print (descriptor
//! listing, certification marker, one line per decodable event, comments
//! passed through).

use std::fs;
use std::path::Path;

use crate::hut::UsageLookup;
use crate::metadata::DeviceMeta;
use crate::render;
use crate::report::ReportModel;
use crate::{Error, Result};

/// One classified recording line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// `R:` — descriptor bytes (length prefix already stripped).
    Rdesc(Vec<u8>),
    /// `E:` — one report event.
    Event { time: String, bytes: Vec<u8> },
    /// `N:` — device name.
    Name(String),
    /// `P:` — physical path of the device.
    Phys(String),
    /// `I:` — bus / vendor / product identity.
    Info { bus: u16, vid: u16, pid: u16 },
    /// Comment, blank line, or anything unrecognized: passed through.
    Comment(String),
}

fn hex_bytes(tokens: &str, lineno: usize) -> Result<Vec<u8>> {
    tokens
        .split_whitespace()
        .map(|t| {
            u8::from_str_radix(t, 16).map_err(|_| Error::Recording {
                line: lineno,
                reason: format!("bad hex byte {t:?}"),
            })
        })
        .collect()
}

/// Split a `<len> <bytes…>` tail, checking the decimal length against the
/// byte count. A mismatch trusts the bytes and logs a warning.
fn counted_bytes(rest: &str, lineno: usize) -> Result<Vec<u8>> {
    let mut parts = rest.trim().splitn(2, ' ');
    let len_token = parts.next().unwrap_or("");
    let declared: usize = len_token.parse().map_err(|_| Error::Recording {
        line: lineno,
        reason: format!("bad length token {len_token:?}"),
    })?;
    let bytes = hex_bytes(parts.next().unwrap_or(""), lineno)?;
    if bytes.len() != declared {
        log::warn!(
            "line {lineno}: declared {declared} byte(s) but found {}",
            bytes.len()
        );
    }
    Ok(bytes)
}

impl Line {
    /// Classify one recording line.
    ///
    /// `lineno` is only used for diagnostics. Unrecognized lines are
    /// comments, not errors; malformed `R:`/`E:`/`I:` payloads are.
    pub fn parse(line: &str, lineno: usize) -> Result<Line> {
        if let Some(rest) = line.strip_prefix("R:") {
            return Ok(Line::Rdesc(counted_bytes(rest, lineno)?));
        }
        if let Some(rest) = line.strip_prefix("E:") {
            let rest = rest.trim();
            let (time, tail) = rest.split_once(' ').ok_or_else(|| Error::Recording {
                line: lineno,
                reason: "event line without data".to_string(),
            })?;
            return Ok(Line::Event {
                time: time.to_string(),
                bytes: counted_bytes(tail, lineno)?,
            });
        }
        if let Some(rest) = line.strip_prefix("N:") {
            return Ok(Line::Name(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("P:") {
            return Ok(Line::Phys(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("I:") {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(Error::Recording {
                    line: lineno,
                    reason: "identity line needs bus, vid, pid".to_string(),
                });
            }
            let parse16 = |t: &str, radix| {
                u16::from_str_radix(t, radix).map_err(|_| Error::Recording {
                    line: lineno,
                    reason: format!("bad identity token {t:?}"),
                })
            };
            return Ok(Line::Info {
                bus: parse16(fields[0], 10)?,
                vid: parse16(fields[1], 16)?,
                pid: parse16(fields[2], 16)?,
            });
        }
        Ok(Line::Comment(line.to_string()))
    }
}

/// One recorded report event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEvent {
    /// Timestamp relative to the first event, `seconds.microseconds`.
    pub time: String,
    /// The raw report, including the ID byte on numbered devices.
    pub bytes: Vec<u8>,
}

/// A loaded recording: metadata, the parsed descriptor, and the events.
#[derive(Debug, Default)]
pub struct Recording {
    pub meta: DeviceMeta,
    /// The parsed descriptor, if the recording carried an `R:` line.
    pub model: Option<ReportModel>,
    pub events: Vec<ReportEvent>,
}

impl Recording {
    /// Parse a whole recording from text.
    pub fn parse(text: &str) -> Result<Recording> {
        let mut rec = Recording::default();
        for (idx, raw) in text.lines().enumerate() {
            match Line::parse(raw, idx + 1)? {
                Line::Rdesc(bytes) => rec.model = Some(ReportModel::parse(&bytes)?),
                Line::Event { time, bytes } => rec.events.push(ReportEvent { time, bytes }),
                Line::Name(name) => rec.meta.name = Some(name),
                Line::Info { bus, vid, pid } => {
                    rec.meta.bus = Some(bus);
                    rec.meta.vid = Some(vid);
                    rec.meta.pid = Some(pid);
                }
                Line::Phys(_) | Line::Comment(_) => {}
            }
        }
        Ok(rec)
    }

    /// Load a recording file.
    pub fn load(path: impl AsRef<Path>) -> Result<Recording> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// Streaming decoder over recording lines.
///
/// Feed lines in order; each call returns the output lines it produces,
/// mirroring the replay tools: an `R:` line yields the descriptor listing
/// (plus the Win8 certification marker), an `E:` line yields its decoded
/// event (or nothing, with a logged diagnostic, when no declared report
/// matches), name/identity lines are consumed silently, and comments pass
/// through untouched.
#[derive(Debug, Default)]
pub struct ReplaySession {
    model: Option<ReportModel>,
    lineno: usize,
}

impl ReplaySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The descriptor seen so far, if any.
    pub fn model(&self) -> Option<&ReportModel> {
        self.model.as_ref()
    }

    /// Process one recording line.
    pub fn feed(&mut self, line: &str, tables: &impl UsageLookup) -> Result<Vec<String>> {
        self.lineno += 1;
        match Line::parse(line, self.lineno)? {
            Line::Rdesc(bytes) => {
                let model = ReportModel::parse(&bytes)?;
                let mut out: Vec<String> =
                    render::dump_rdesc(&model, tables).lines().map(String::from).collect();
                if model.win8() {
                    out.push("**** win 8 certified ****".to_string());
                }
                self.model = Some(model);
                Ok(out)
            }
            Line::Event { time, bytes } => {
                let Some(model) = &self.model else {
                    log::warn!("line {}: event before any descriptor", self.lineno);
                    return Ok(Vec::new());
                };
                Ok(model
                    .decode(&bytes, tables)
                    .map(|decoded| decoded.event_line(&time))
                    .into_iter()
                    .collect())
            }
            Line::Name(_) | Line::Phys(_) | Line::Info { .. } => Ok(Vec::new()),
            Line::Comment(text) => Ok(vec![text]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_lines() {
        assert_eq!(
            Line::parse("N: Some Device", 1).unwrap(),
            Line::Name("Some Device".to_string())
        );
        assert_eq!(
            Line::parse("I: 3 093a 2510", 2).unwrap(),
            Line::Info {
                bus: 3,
                vid: 0x093a,
                pid: 0x2510
            }
        );
        assert_eq!(
            Line::parse("E: 0.000000 3 01 0a f6", 3).unwrap(),
            Line::Event {
                time: "0.000000".to_string(),
                bytes: vec![0x01, 0x0a, 0xf6]
            }
        );
        assert_eq!(
            Line::parse("# comment", 4).unwrap(),
            Line::Comment("# comment".to_string())
        );
        assert!(Line::parse("E: 0.1 2 zz", 5).is_err());
    }

    #[test]
    fn rdesc_line_strips_the_length_token() {
        let line = Line::parse("R: 3 05 01 c0", 1).unwrap();
        assert_eq!(line, Line::Rdesc(vec![0x05, 0x01, 0xc0]));
    }
}
