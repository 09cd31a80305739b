use crate::network::client::CommandErrors;
use crate::network::frame::ReplyValue;
use alloc::string::{String, ToString};
use bytes::{Bytes, BytesMut};
use redis_protocol::resp2::types::Frame as Resp2Frame;
use redis_protocol::resp3::types::DecodedFrame;
use redis_protocol::resp3::types::Frame as Resp3Frame;
use redis_protocol::types::RedisProtocolError;
use redis_protocol::{resp2, resp3};

/// Generic wrapper for redis-protocol encode/decode methods
pub trait Protocol: Clone {
    type FrameType: ReplyValue;

    /// Decodes the next complete frame. Returns the frame and the number of consumed bytes.
    fn decode(&self, data: &Bytes) -> Result<Option<(Self::FrameType, usize)>, RedisProtocolError>;

    /// Encodes Frame to buffer
    fn encode_bytes(&self, buf: &mut BytesMut, frame: &Self::FrameType) -> Result<usize, RedisProtocolError>;

    /// Wraps error replies to CommandErrors
    fn assert_error(&self, frame: &Self::FrameType) -> Result<(), CommandErrors>;

    /// Returns true if protocol switch, respectively HELLO command, is needed
    fn requires_hello(&self) -> bool {
        false
    }
}

/// Abstraction for RESP2 protocol
#[derive(Clone, Debug)]
pub struct Resp2 {}

impl Protocol for Resp2 {
    type FrameType = Resp2Frame;

    fn decode(&self, data: &Bytes) -> Result<Option<(Self::FrameType, usize)>, RedisProtocolError> {
        resp2::decode::decode(data)
    }

    fn encode_bytes(&self, buf: &mut BytesMut, frame: &Self::FrameType) -> Result<usize, RedisProtocolError> {
        resp2::encode::encode_bytes(buf, frame)
    }

    fn assert_error(&self, frame: &Self::FrameType) -> Result<(), CommandErrors> {
        if let Resp2Frame::Error(message) = frame {
            return Err(CommandErrors::ErrorResponse(message.to_string()));
        }

        Ok(())
    }
}

/// Abstraction for RESP3 protocol
#[derive(Clone, Debug)]
pub struct Resp3 {}

impl Protocol for Resp3 {
    type FrameType = Resp3Frame;

    /// Streamed frames are not supported. Redis does not answer any pub/sub command with a
    /// streamed frame, so they are reported as incomplete.
    fn decode(&self, data: &Bytes) -> Result<Option<(Self::FrameType, usize)>, RedisProtocolError> {
        match resp3::decode::streaming::decode(data)? {
            Some((DecodedFrame::Complete(frame), size)) => Ok(Some((frame, size))),
            Some((DecodedFrame::Streaming(_), _)) | None => Ok(None),
        }
    }

    fn encode_bytes(&self, buf: &mut BytesMut, frame: &Self::FrameType) -> Result<usize, RedisProtocolError> {
        resp3::encode::complete::encode_bytes(buf, frame)
    }

    fn assert_error(&self, frame: &Self::FrameType) -> Result<(), CommandErrors> {
        match frame {
            Resp3Frame::BlobError { data, attributes: _ } => Err(CommandErrors::ErrorResponse(
                String::from_utf8_lossy(data).to_string(),
            )),
            Resp3Frame::SimpleError { data, attributes: _ } => Err(CommandErrors::ErrorResponse(data.to_string())),
            _ => Ok(()),
        }
    }

    fn requires_hello(&self) -> bool {
        true
    }
}
