//! Line framing for the coordinator wire protocol.
//!
//! Each frame is one JSON object terminated by `\n`. The decoder buffers
//! partial lines across reads, so a short read never yields a malformed
//! message; a malformed line is discarded with a warning and decoding resumes
//! at the next newline. The codec carries no message semantics beyond the
//! envelope.

use crate::protocol::{CoordinatorMessage, ServiceMessage};
use bytes::{BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Upper bound on a single frame, newline included.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Errors from encoding or decoding wire frames.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode inbound frame: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("frame exceeds the {MAX_FRAME_LEN} byte limit")]
    FrameTooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Newline-delimited JSON codec for coordinator traffic.
#[derive(Debug, Default)]
pub struct WireCodec {
    /// Set while skipping the remainder of an oversized frame.
    discarding: bool,
}

impl WireCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_frame(line: &[u8]) -> Result<CoordinatorMessage, WireError> {
    if line.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLong);
    }
    serde_json::from_slice(line).map_err(WireError::Decode)
}

impl Decoder for WireCodec {
    type Item = CoordinatorMessage;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(newline) = src.iter().position(|&b| b == b'\n') else {
                if src.len() > MAX_FRAME_LEN {
                    warn!(limit = MAX_FRAME_LEN, "oversized frame, discarding");
                    src.clear();
                    self.discarding = true;
                }
                return Ok(None);
            };

            let line = src.split_to(newline + 1);
            if self.discarding {
                // Tail end of an oversized frame; resume at the next line.
                self.discarding = false;
                continue;
            }

            let mut frame = &line[..line.len() - 1];
            if frame.last() == Some(&b'\r') {
                frame = &frame[..frame.len() - 1];
            }
            if frame.is_empty() {
                continue;
            }

            match parse_frame(frame) {
                Ok(message) => return Ok(Some(message)),
                Err(err) => {
                    warn!(%err, "discarding malformed frame");
                    continue;
                }
            }
        }
    }
}

impl Encoder<ServiceMessage> for WireCodec {
    type Error = WireError;

    fn encode(&mut self, message: ServiceMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_string(&message).map_err(WireError::Encode)?;
        dst.reserve(json.len() + 1);
        dst.put(json.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}
