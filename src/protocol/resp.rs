//! RESP (Redis Serialization Protocol) codec
//!
//! Client-side subset of RESP2 plus the RESP3 null, enough to talk to a
//! FalkorDB server: commands go out as arrays of bulk strings, replies come
//! back as arbitrarily nested frames.
//! Based on https://redis.io/docs/reference/protocol-spec/

use bytes::BytesMut;
use std::io::{self, Write};
use thiserror::Error;

/// RESP protocol errors
#[derive(Error, Debug)]
pub enum RespError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Protocol parsing error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid encoding
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

pub type RespResult<T> = Result<T, RespError>;

/// RESP value types
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// Simple string: +OK\r\n
    SimpleString(String),
    /// Error: -ERR message\r\n
    Error(String),
    /// Integer: :1000\r\n
    Integer(i64),
    /// Bulk string: $6\r\nfoobar\r\n (or $-1\r\n for null)
    BulkString(Option<Vec<u8>>),
    /// Array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n
    Array(Vec<RespValue>),
    /// Null: _\r\n (RESP3) or the null array *-1\r\n
    Null,
}

impl RespValue {
    /// Build a command frame: an array of bulk strings
    pub fn command<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RespValue::Array(
            args.into_iter()
                .map(|a| RespValue::BulkString(Some(a.as_ref().as_bytes().to_vec())))
                .collect(),
        )
    }

    /// Encode RESP value to bytes
    pub fn encode(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        match self {
            RespValue::SimpleString(s) => {
                write!(buf, "+{}\r\n", s)?;
            }
            RespValue::Error(e) => {
                write!(buf, "-{}\r\n", e)?;
            }
            RespValue::Integer(i) => {
                write!(buf, ":{}\r\n", i)?;
            }
            RespValue::BulkString(None) => {
                write!(buf, "$-1\r\n")?;
            }
            RespValue::BulkString(Some(data)) => {
                write!(buf, "${}\r\n", data.len())?;
                buf.extend_from_slice(data);
                write!(buf, "\r\n")?;
            }
            RespValue::Array(items) => {
                write!(buf, "*{}\r\n", items.len())?;
                for item in items {
                    item.encode(buf)?;
                }
            }
            RespValue::Null => {
                write!(buf, "_\r\n")?;
            }
        }
        Ok(())
    }

    /// Parse one RESP value from the front of the buffer.
    ///
    /// Returns `Ok(None)` when the buffer holds only part of a frame; in that
    /// case nothing is consumed. Each call starts over from the first byte, so
    /// a reader that retries as data trickles in should keep a
    /// [`RespDecoder`] instead.
    pub fn decode(buf: &mut BytesMut) -> RespResult<Option<RespValue>> {
        RespDecoder::new().decode(buf)
    }

    /// Parse a complete frame from a byte slice, returning the value and the
    /// number of bytes it occupies.
    fn parse(input: &[u8]) -> RespResult<Option<(RespValue, usize)>> {
        let Some((line, mut pos)) = read_line(input) else {
            return Ok(None);
        };
        if line.is_empty() {
            return Err(RespError::Protocol("Empty RESP line".to_string()));
        }

        let body = &line[1..];
        let value = match line[0] {
            b'+' => RespValue::SimpleString(utf8(body)?),
            b'-' => RespValue::Error(utf8(body)?),
            b':' => RespValue::Integer(parse_int(body, "integer")?),
            b'_' => {
                if !body.is_empty() {
                    return Err(RespError::Protocol("Invalid null value".to_string()));
                }
                RespValue::Null
            }
            b'$' => match bulk_len(body)? {
                None => RespValue::BulkString(None),
                Some(len) => {
                    if input.len() < pos + len + 2 {
                        return Ok(None);
                    }
                    let data = input[pos..pos + len].to_vec();
                    if &input[pos + len..pos + len + 2] != b"\r\n" {
                        return Err(RespError::Protocol(
                            "Missing \\r\\n after bulk string".to_string(),
                        ));
                    }
                    pos += len + 2;
                    RespValue::BulkString(Some(data))
                }
            },
            b'*' => match array_len(body)? {
                None => RespValue::Null,
                Some(len) => {
                    // Every element takes at least 3 bytes, so the remaining
                    // input bounds what can actually arrive.
                    let mut elements = Vec::with_capacity(len.min((input.len() - pos) / 3));
                    for _ in 0..len {
                        match Self::parse(&input[pos..])? {
                            Some((val, used)) => {
                                elements.push(val);
                                pos += used;
                            }
                            None => return Ok(None),
                        }
                    }
                    RespValue::Array(elements)
                }
            },
            other => {
                return Err(RespError::Protocol(format!(
                    "Unknown RESP type: {}",
                    other as char
                )))
            }
        };

        Ok(Some((value, pos)))
    }

    /// Convert to array or error
    pub fn as_array(&self) -> RespResult<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Ok(arr),
            other => Err(RespError::Protocol(format!("Expected array, got {:?}", other))),
        }
    }

    /// Convert to integer or error
    pub fn as_integer(&self) -> RespResult<i64> {
        match self {
            RespValue::Integer(i) => Ok(*i),
            other => Err(RespError::Protocol(format!("Expected integer, got {:?}", other))),
        }
    }

    /// Convert to bulk string or error
    pub fn as_bulk_string(&self) -> RespResult<Option<&[u8]>> {
        match self {
            RespValue::BulkString(Some(data)) => Ok(Some(data)),
            RespValue::BulkString(None) | RespValue::Null => Ok(None),
            other => Err(RespError::Protocol(format!(
                "Expected bulk string, got {:?}",
                other
            ))),
        }
    }

    /// Convert a bulk or simple string to an owned UTF-8 string
    pub fn as_string(&self) -> RespResult<Option<String>> {
        if let RespValue::SimpleString(s) = self {
            return Ok(Some(s.clone()));
        }
        match self.as_bulk_string()? {
            Some(bytes) => Ok(Some(utf8(bytes)?)),
            None => Ok(None),
        }
    }
}

/// Largest bulk string accepted, matching the server-side default
/// `proto-max-bulk-len`
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest array length accepted
const MAX_ARRAY_LEN: i64 = i32::MAX as i64;

/// Incremental reply decoder.
///
/// Remembers how far into the buffer it has already validated, so bytes that
/// arrive in many reads are scanned once. The frame is materialized into a
/// [`RespValue`] only after its last byte is buffered.
#[derive(Debug, Default)]
pub struct RespDecoder {
    /// Offset of the first element not yet scanned
    cursor: usize,
    /// Elements still expected by each open array, innermost last
    open: Vec<usize>,
}

impl RespDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next frame, or return `Ok(None)` if it is not fully
    /// buffered yet. The same buffer, with more bytes appended, must be passed
    /// on the next call.
    pub fn decode(&mut self, buf: &mut BytesMut) -> RespResult<Option<RespValue>> {
        let Some(len) = self.scan(&buf[..])? else {
            return Ok(None);
        };

        let frame = buf.split_to(len);
        match RespValue::parse(&frame)? {
            Some((value, used)) if used == len => Ok(Some(value)),
            _ => Err(RespError::Protocol("Frame boundary mismatch".to_string())),
        }
    }

    /// Advance over complete elements; returns the frame length once the
    /// outermost element is complete.
    fn scan(&mut self, input: &[u8]) -> RespResult<Option<usize>> {
        loop {
            let Some((line, next)) = read_line(&input[self.cursor..]) else {
                return Ok(None);
            };
            if line.is_empty() {
                return Err(RespError::Protocol("Empty RESP line".to_string()));
            }

            let body = &line[1..];
            let mut end = self.cursor + next;
            let mut opens = None;
            match line[0] {
                b'+' | b'-' | b':' | b'_' => {}
                b'$' => {
                    if let Some(len) = bulk_len(body)? {
                        end += len + 2;
                        if input.len() < end {
                            return Ok(None);
                        }
                    }
                }
                b'*' => opens = array_len(body)?.filter(|&n| n > 0),
                other => {
                    return Err(RespError::Protocol(format!(
                        "Unknown RESP type: {}",
                        other as char
                    )))
                }
            }
            self.cursor = end;

            if let Some(n) = opens {
                self.open.push(n);
                continue;
            }

            // One element finished; close every array it completes
            loop {
                match self.open.last_mut() {
                    None => {
                        let len = self.cursor;
                        self.cursor = 0;
                        return Ok(Some(len));
                    }
                    Some(remaining) => {
                        *remaining -= 1;
                        if *remaining > 0 {
                            break;
                        }
                        self.open.pop();
                    }
                }
            }
        }
    }
}

fn bulk_len(body: &[u8]) -> RespResult<Option<usize>> {
    checked_len(parse_int(body, "bulk string length")?, MAX_BULK_LEN, "bulk string")
}

fn array_len(body: &[u8]) -> RespResult<Option<usize>> {
    checked_len(parse_int(body, "array length")?, MAX_ARRAY_LEN, "array")
}

/// Negative lengths mean null
fn checked_len(len: i64, max: i64, what: &str) -> RespResult<Option<usize>> {
    if len < 0 {
        Ok(None)
    } else if len > max {
        Err(RespError::Protocol(format!("{} length {} exceeds {}", what, len, max)))
    } else {
        Ok(Some(len as usize))
    }
}

/// Find a CRLF-terminated line; returns the line without CRLF and the offset
/// just past it.
fn read_line(input: &[u8]) -> Option<(&[u8], usize)> {
    input
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|pos| (&input[..pos], pos + 2))
}

fn utf8(bytes: &[u8]) -> RespResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| RespError::InvalidEncoding(e.to_string()))
}

fn parse_int(bytes: &[u8], what: &str) -> RespResult<i64> {
    utf8(bytes)?
        .parse::<i64>()
        .map_err(|e| RespError::Protocol(format!("Invalid {}: {}", what, e)))
}
