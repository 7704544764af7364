use bytes::{Buf, BytesMut};
use std::io::{self, Cursor};
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame, Limits};

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("protocol error; {0}")]
    Protocol(#[from] frame::Error),
    #[error("connection closed in the middle of a frame, {0} bytes left unparsed")]
    Truncated(usize),
}

/// A reply sent back to the client: either `+<text>\r\n` or `-<text>\r\n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Simple(String),
    Error(String),
}

impl Reply {
    pub fn simple(s: impl Into<String>) -> Reply {
        Reply::Simple(s.into())
    }

    pub fn error(s: impl Into<String>) -> Reply {
        Reply::Error(s.into())
    }

    fn encode_into(&self, dst: &mut BytesMut) {
        let (prefix, text) = match self {
            Reply::Simple(s) => (b'+', s),
            Reply::Error(s) => (b'-', s),
        };

        dst.reserve(1 + text.len() + CRLF.len());
        dst.extend_from_slice(&[prefix]);
        dst.extend_from_slice(text.as_bytes());
        dst.extend_from_slice(CRLF);
    }
}

/// Decodes request frames out of the read buffer and encodes replies into the write buffer.
#[derive(Clone, Debug, Default)]
pub struct FrameCodec {
    limits: Limits,
    // Buffer length below which the pending frame can't be complete yet.
    wanted: usize,
}

impl FrameCodec {
    pub fn new(limits: Limits) -> FrameCodec {
        FrameCodec { limits, wanted: 0 }
    }

    fn too_large(&self) -> Error {
        frame::Error::FrameTooLarge(self.limits.max_frame_len).into()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() || src.len() < self.wanted {
            return Ok(None);
        }

        // Scan first so that a frame still arriving is never copied out of the buffer.
        let mut cursor = Cursor::new(&src[..]);
        match Frame::check(&mut cursor, &self.limits) {
            Ok(()) => {}
            Err(frame::Error::Incomplete) => {
                self.wanted = (cursor.position() as usize).max(src.len() + 1);
                if self.wanted > self.limits.max_frame_len {
                    return Err(self.too_large());
                }
                return Ok(None); // Not enough data to parse a frame.
            }
            Err(err) => return Err(err.into()),
        }

        let length = cursor.position() as usize;
        if length > self.limits.max_frame_len {
            return Err(self.too_large());
        }

        cursor.set_position(0);
        let frame = Frame::parse(&mut cursor, &self.limits)?;

        // Remove the parsed frame from the buffer.
        src.advance(length);
        self.wanted = 0;

        Ok(Some(frame))
    }

    // Bytes left over when the stream ends are a short read, not a clean close.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() => Ok(None),
            None => Err(Error::Truncated(buf.len())),
        }
    }
}

impl Encoder<Reply> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, reply: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        reply.encode_into(dst);
        Ok(())
    }
}
