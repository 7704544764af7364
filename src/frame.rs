// https://redis.io/docs/reference/protocol-spec

use std::fmt;
use std::io::Cursor;
use std::str;

use bytes::{Buf, Bytes};
use strum_macros::Display;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1024 * 1024;
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;
pub const DEFAULT_MAX_FRAME_LEN: usize = 512 * 1024 * 1024;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("unrecognized RESP type {:?}", type_char(.0))]
    UnknownType(u8),
    #[error("invalid {kind} length {line:?}")]
    InvalidLength { kind: Kind, line: String },
    #[error("{kind} length {length} exceeds the limit of {limit}")]
    LengthTooLarge {
        kind: Kind,
        length: usize,
        limit: usize,
    },
    #[error("array nesting exceeds the limit of {0}")]
    TooDeep(usize),
    #[error("line exceeds the limit of {0} bytes without a CRLF")]
    LineTooLong(usize),
    #[error("frame exceeds the limit of {0} bytes")]
    FrameTooLarge(usize),
}

fn type_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Failure of one of the typed accessors on [`Frame`].
#[derive(Debug, ThisError, PartialEq)]
pub enum ValueError {
    #[error("expected {expected}, got {actual}")]
    WrongKind { expected: Kind, actual: Kind },
    #[error("value is not an integer or out of range")]
    InvalidInteger,
    #[error("invalid UTF-8 string")]
    InvalidUtf8(#[from] str::Utf8Error),
}

/// Bounds applied while decoding. Exceeding any of them is a protocol error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of arrays. A flat command array has depth 1.
    pub max_depth: usize,
    /// Maximum declared element count of a single array.
    pub max_array_len: usize,
    /// Maximum declared length of a bulk string.
    pub max_bulk_len: usize,
    /// Maximum number of bytes a line may hold before its CRLF.
    pub max_line_len: usize,
    /// Maximum encoded size of one whole frame, elements included.
    pub max_frame_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Kind {
    #[strum(serialize = "simple string")]
    SimpleString, // '+'
    #[strum(serialize = "bulk string")]
    BulkString, // '$'
    #[strum(serialize = "integer")]
    Integer, // ':'
    #[strum(serialize = "array")]
    Array, // '*'
}

impl TryFrom<u8> for Kind {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'$' => Ok(Self::BulkString),
            b':' => Ok(Self::Integer),
            b'*' => Ok(Self::Array),
            _ => Err(Error::UnknownType(byte)),
        }
    }
}

impl From<Kind> for u8 {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::SimpleString => b'+',
            Kind::BulkString => b'$',
            Kind::Integer => b':',
            Kind::Array => b'*',
        }
    }
}

/// A decoded RESP value.
///
/// Integers keep the raw digits they were sent with; they are only interpreted when read through
/// [`Frame::to_integer`] or [`Frame::as_integer`].
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(Bytes),
    Bulk(Bytes),
    Integer(Bytes),
    Array(Vec<Frame>),
}

impl Frame {
    pub fn simple(s: impl Into<Bytes>) -> Frame {
        Frame::Simple(s.into())
    }

    pub fn bulk(data: impl Into<Bytes>) -> Frame {
        Frame::Bulk(data.into())
    }

    pub fn integer(i: i64) -> Frame {
        Frame::Integer(Bytes::from(i.to_string()))
    }

    pub fn array(frames: Vec<Frame>) -> Frame {
        Frame::Array(frames)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Frame::Simple(_) => Kind::SimpleString,
            Frame::Bulk(_) => Kind::BulkString,
            Frame::Integer(_) => Kind::Integer,
            Frame::Array(_) => Kind::Array,
        }
    }

    pub fn to_array(&self) -> Result<&[Frame], ValueError> {
        match self {
            Frame::Array(frames) => Ok(frames.as_slice()),
            frame => Err(frame.wrong_kind(Kind::Array)),
        }
    }

    /// Both simple and bulk strings may be read as text, as long as they hold valid UTF-8.
    pub fn to_str(&self) -> Result<&str, ValueError> {
        match self {
            Frame::Simple(bytes) | Frame::Bulk(bytes) => Ok(str::from_utf8(bytes)?),
            frame => Err(frame.wrong_kind(Kind::BulkString)),
        }
    }

    pub fn to_integer(&self) -> Result<i64, ValueError> {
        match self {
            Frame::Integer(digits) => str::from_utf8(digits)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or(ValueError::InvalidInteger),
            frame => Err(frame.wrong_kind(Kind::Integer)),
        }
    }

    pub fn to_bytes(&self) -> Result<&Bytes, ValueError> {
        match self {
            Frame::Simple(bytes) | Frame::Bulk(bytes) | Frame::Integer(bytes) => Ok(bytes),
            frame => Err(frame.wrong_kind(Kind::BulkString)),
        }
    }

    /// Elements of an array, or an empty slice for any other kind.
    pub fn as_array(&self) -> &[Frame] {
        self.to_array().unwrap_or_default()
    }

    /// Text of a simple or bulk string, or an empty string for any other kind. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn as_string(&self) -> String {
        match self {
            Frame::Simple(bytes) | Frame::Bulk(bytes) => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            _ => String::new(),
        }
    }

    /// Value of an integer, or 0 for any other kind and for digits that don't parse.
    pub fn as_integer(&self) -> i64 {
        self.to_integer().unwrap_or_default()
    }

    /// Raw payload, or empty bytes for an array.
    pub fn as_bytes(&self) -> Bytes {
        self.to_bytes().cloned().unwrap_or_default()
    }

    fn wrong_kind(&self, expected: Kind) -> ValueError {
        ValueError::WrongKind {
            expected,
            actual: self.kind(),
        }
    }

    /// Checks that a whole frame is buffered without copying any of it. On success the cursor
    /// sits right after the frame.
    ///
    /// On [`Error::Incomplete`] the cursor position is a lower bound on the buffer length the
    /// frame needs whenever a bulk payload is what's missing.
    pub fn check(src: &mut Cursor<&[u8]>, limits: &Limits) -> Result<(), Error> {
        check_frame(src, limits, 0)
    }

    pub fn parse(src: &mut Cursor<&[u8]>, limits: &Limits) -> Result<Self, Error> {
        parse_frame(src, limits, 0)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.serialize_into(&mut bytes);
        bytes
    }

    fn serialize_into(&self, bytes: &mut Vec<u8>) {
        bytes.push(u8::from(self.kind()));

        match self {
            Frame::Simple(data) | Frame::Integer(data) => {
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
            }
            Frame::Bulk(data) => {
                bytes.extend_from_slice(data.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
            }
            Frame::Array(frames) => {
                bytes.extend_from_slice(frames.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in frames {
                    frame.serialize_into(bytes);
                }
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", String::from_utf8_lossy(s)),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Integer(digits) => write!(f, ":{}", String::from_utf8_lossy(digits)),
            Frame::Array(frames) => {
                write!(f, "*{}[", frames.len())?;
                for (i, frame) in frames.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", frame)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn check_frame(src: &mut Cursor<&[u8]>, limits: &Limits, depth: usize) -> Result<(), Error> {
    match Kind::try_from(get_byte(src)?)? {
        Kind::SimpleString | Kind::Integer => get_line(src, limits).map(|_| ()),
        kind @ Kind::BulkString => {
            let length = get_length(src, limits, kind, limits.max_bulk_len)?;
            skip(src, length.saturating_add(CRLF.len()))
        }
        kind @ Kind::Array => {
            if depth >= limits.max_depth {
                return Err(Error::TooDeep(limits.max_depth));
            }

            let length = get_length(src, limits, kind, limits.max_array_len)?;
            for _ in 0..length {
                check_frame(src, limits, depth + 1)?;
            }

            Ok(())
        }
    }
}

fn parse_frame(src: &mut Cursor<&[u8]>, limits: &Limits, depth: usize) -> Result<Frame, Error> {
    // The first byte in an RESP-serialized payload always identifies its type.
    let kind = Kind::try_from(get_byte(src)?)?;

    match kind {
        Kind::SimpleString => {
            let line = get_line(src, limits)?;
            Ok(Frame::Simple(Bytes::copy_from_slice(line)))
        }
        Kind::Integer => {
            let line = get_line(src, limits)?;
            Ok(Frame::Integer(Bytes::copy_from_slice(line)))
        }
        // $<length>\r\n<data>\r\n
        Kind::BulkString => {
            let length = get_length(src, limits, kind, limits.max_bulk_len)?;
            get_bulk(src, length).map(Frame::Bulk)
        }
        // *<number-of-elements>\r\n<element-1>...<element-n>
        Kind::Array => {
            if depth >= limits.max_depth {
                return Err(Error::TooDeep(limits.max_depth));
            }

            let length = get_length(src, limits, kind, limits.max_array_len)?;

            // Every element takes at least three bytes, so the buffered data bounds the
            // allocation even when the declared length is large.
            let mut frames = Vec::with_capacity(length.min(src.remaining()));
            for _ in 0..length {
                frames.push(parse_frame(src, limits, depth + 1)?);
            }

            Ok(Frame::Array(frames))
        }
    }
}

/// Returns the bytes up to the next CRLF and moves the cursor past it. A lone `\n` does not end
/// the line.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>, limits: &Limits) -> Result<&'a [u8], Error> {
    let buf: &'a [u8] = *src.get_ref();
    let start = src.position() as usize;

    let end = match buf[start..].windows(2).position(|window| window == CRLF) {
        Some(index) => start + index,
        // The last buffered byte could still be the `\r` of the terminator.
        None if buf.len() - start > limits.max_line_len.saturating_add(1) => {
            return Err(Error::LineTooLong(limits.max_line_len))
        }
        None => return Err(Error::Incomplete),
    };

    if end - start > limits.max_line_len {
        return Err(Error::LineTooLong(limits.max_line_len));
    }

    src.set_position((end + CRLF.len()) as u64);

    Ok(&buf[start..end])
}

fn get_length(
    src: &mut Cursor<&[u8]>,
    limits: &Limits,
    kind: Kind,
    limit: usize,
) -> Result<usize, Error> {
    let line = get_line(src, limits)?;
    let length = str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| Error::InvalidLength {
            kind,
            line: String::from_utf8_lossy(line).into_owned(),
        })?;

    if length > limit {
        return Err(Error::LengthTooLarge {
            kind,
            length,
            limit,
        });
    }

    Ok(length)
}

/// Reads the payload of a bulk string together with its trailing two bytes, keeping only the
/// payload.
fn get_bulk(src: &mut Cursor<&[u8]>, length: usize) -> Result<Bytes, Error> {
    let needed = length.saturating_add(CRLF.len());
    if src.remaining() < needed {
        return Err(Error::Incomplete);
    }

    let start = src.position() as usize;
    let data = Bytes::copy_from_slice(&src.get_ref()[start..start + length]);
    src.advance(needed);

    Ok(data)
}

/// Moves the cursor `n` bytes forward, even past the end of the buffer, and reports `Incomplete`
/// if fewer than `n` bytes were there.
fn skip(src: &mut Cursor<&[u8]>, n: usize) -> Result<(), Error> {
    let remaining = src.remaining();
    src.set_position(src.position().saturating_add(n as u64));

    if remaining < n {
        return Err(Error::Incomplete);
    }
    Ok(())
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}
