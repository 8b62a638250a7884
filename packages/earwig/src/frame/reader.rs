//! Serial frame acquisition.
//!
//! Wire format, one frame per request:
//!
//! ```text
//! -> '3'
//! <- 12,-4,7,...,31,c\n      (c: more lines follow)
//! <- 9,0,...,-2,e\n          (e: end of frame)
//! ```
//!
//! Each line is a comma separated list of signed decimal integers followed by
//! a terminal comma and a single framing character. The values of all lines
//! are concatenated into one [`RawFrame`].

use std::io::{BufRead, BufReader, Read, Write};

use log::debug;

use crate::{
    constants::{END_OF_FRAME, FRAME_LEN, MAX_TOKEN_BYTES, TRIGGER_BYTE},
    error::ProtocolError,
};

/// One acquisition cycle's integers, in wire order.
pub type RawFrame = Vec<i32>;

/// Opens a fresh link to the sensor.
///
/// The link is closed by dropping it, so each call to [`FrameReader`] owns
/// exactly one open → trigger → read → close sequence.
pub trait Connect {
    type Link: Read + Write;

    fn open(&mut self) -> Result<Self::Link, ProtocolError>;
}

/// Anything that can hand the session one raw frame per cycle.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RawFrame, ProtocolError>;
}

/// Frame reader over any [`Connect`] implementation.
pub struct FrameReader<C: Connect> {
    connector: C,
    trigger: u8,
    expected: usize,
}

impl<C: Connect> FrameReader<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            trigger: TRIGGER_BYTE,
            expected: FRAME_LEN,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

impl<C: Connect> FrameSource for FrameReader<C> {
    fn read_frame(&mut self) -> Result<RawFrame, ProtocolError> {
        let mut link = self.connector.open()?;
        link.write_all(&[self.trigger])?;
        link.flush()?;

        let frame = parse_frame(BufReader::new(&mut link), self.expected)?;
        debug!("received frame of {} values", frame.len());
        Ok(frame)
    }
}

/// Read lines until the end-of-frame marker and return the concatenated values.
///
/// Fails if the frame does not hold exactly `expected` values. A single line
/// longer than a whole frame could ever be is cut off and reported as
/// [`ProtocolError::Overflow`], so a device that never sends `\n` cannot grow
/// the buffer without bound.
pub fn parse_frame<R: BufRead>(mut reader: R, expected: usize) -> Result<RawFrame, ProtocolError> {
    // every value at full width, then marker, `\r` and `\n`
    let line_cap = (expected * MAX_TOKEN_BYTES + 3) as u64;

    let mut data = Vec::with_capacity(expected);
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        line_no += 1;
        buf.clear();
        let n = (&mut reader).take(line_cap).read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Err(ProtocolError::UnexpectedEof {
                received: data.len(),
            });
        }
        if n as u64 == line_cap && buf.last() != Some(&b'\n') {
            return Err(ProtocolError::Overflow { expected });
        }

        let line = std::str::from_utf8(&buf)
            .ok()
            .filter(|s| s.is_ascii())
            .ok_or(ProtocolError::NonAscii { line: line_no })?;

        let done = parse_line(line, line_no, &mut data)?;
        if data.len() > expected {
            return Err(ProtocolError::Overflow { expected });
        }
        if done {
            break;
        }
    }

    if data.len() != expected {
        return Err(ProtocolError::FrameLength {
            expected,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// Append one line's values to `out`; returns `true` on the final line.
fn parse_line(line: &str, line_no: usize, out: &mut RawFrame) -> Result<bool, ProtocolError> {
    let body = line.strip_suffix('\n').unwrap_or(line);
    let body = body.strip_suffix('\r').unwrap_or(body);

    let mut chars = body.chars();
    let marker = chars
        .next_back()
        .ok_or(ProtocolError::MissingSentinel { line: line_no })?;
    let records = chars
        .as_str()
        .strip_suffix(',')
        .ok_or(ProtocolError::MissingSentinel { line: line_no })?;

    if !records.is_empty() {
        for token in records.split(',') {
            let value = token
                .trim()
                .parse::<i32>()
                .map_err(|_| ProtocolError::InvalidToken {
                    line: line_no,
                    token: token.to_string(),
                })?;
            out.push(value);
        }
    }

    Ok(marker == END_OF_FRAME)
}
