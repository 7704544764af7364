use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{self, FrameCodec, Reply};
use crate::frame::{Frame, Limits};

pub struct Connection<S> {
    pub id: Uuid,
    // Data is read from the stream into the codec's read buffer. When a frame is parsed, the
    // corresponding data is removed from the buffer.
    frames: Framed<S, FrameCodec>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Connection<S> {
        Connection::with_limits(stream, Limits::default())
    }

    pub fn with_limits(stream: S, limits: Limits) -> Connection<S> {
        Connection {
            id: Uuid::new_v4(),
            // Allocate the read buffer with 4kb of capacity.
            frames: Framed::with_capacity(stream, FrameCodec::new(limits), 4096),
        }
    }

    /// Reads the next frame. `None` means the peer closed the stream between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, codec::Error> {
        self.frames.next().await.transpose()
    }

    /// Writes the reply and flushes it before returning.
    pub async fn write_reply(&mut self, reply: Reply) -> Result<(), codec::Error> {
        self.frames.send(reply).await
    }
}
