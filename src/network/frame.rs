use alloc::string::String;
use bytes::Bytes;
use redis_protocol::resp2::types::Frame as Resp2Frame;
use redis_protocol::resp3::types::Frame as Resp3Frame;

/// Typed access to decoded RESP2/RESP3 frames
///
/// Unifies the frame types of both protocol versions, so commands and the push message decoder
/// can be written once.
pub trait ReplyValue: Sized {
    /// Returns the inner bytes of Bulk/Simple (RESP2) or Blob/Simple (RESP3) string frames
    fn to_bytes_value(&self) -> Option<Bytes>;

    /// Returns the inner integer value, None in case frame is not integer type
    fn to_integer(&self) -> Option<i64>;

    /// Returns the elements of array frames. RESP3 push frames are treated as arrays as well.
    fn elements(&self) -> Option<&[Self]>;

    /// True for RESP2 Null and RESP3 Null frames
    fn is_nil(&self) -> bool;

    /// True if the frame is an out-of-band push message. RESP2 has no dedicated type for this.
    fn is_push(&self) -> bool;

    /// True if the protocol marks push messages with a dedicated frame type (RESP3)
    fn supports_push() -> bool;

    /// Lossy text representation of string frames
    fn to_text(&self) -> Option<String>;
}

impl ReplyValue for Resp2Frame {
    fn to_bytes_value(&self) -> Option<Bytes> {
        match self {
            Resp2Frame::BulkString(data) | Resp2Frame::SimpleString(data) => Some(data.clone()),
            _ => None,
        }
    }

    fn to_integer(&self) -> Option<i64> {
        match self {
            Resp2Frame::Integer(number) => Some(*number),
            _ => None,
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        match self {
            Resp2Frame::Array(data) => Some(data),
            _ => None,
        }
    }

    fn is_nil(&self) -> bool {
        self.is_null()
    }

    fn is_push(&self) -> bool {
        false
    }

    fn supports_push() -> bool {
        false
    }

    fn to_text(&self) -> Option<String> {
        self.to_string()
    }
}

impl ReplyValue for Resp3Frame {
    fn to_bytes_value(&self) -> Option<Bytes> {
        match self {
            Resp3Frame::BlobString { data, attributes: _ } | Resp3Frame::SimpleString { data, attributes: _ } => {
                Some(data.clone())
            }
            _ => None,
        }
    }

    fn to_integer(&self) -> Option<i64> {
        match self {
            Resp3Frame::Number { data, attributes: _ } => Some(*data),
            _ => None,
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        match self {
            Resp3Frame::Array { data, attributes: _ } | Resp3Frame::Push { data, attributes: _ } => Some(data),
            _ => None,
        }
    }

    fn is_nil(&self) -> bool {
        self.is_null()
    }

    fn is_push(&self) -> bool {
        matches!(self, Resp3Frame::Push { .. })
    }

    fn supports_push() -> bool {
        true
    }

    fn to_text(&self) -> Option<String> {
        self.to_string()
    }
}
