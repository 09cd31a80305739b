//! Helpers for building and reading RESP3 frames.
use crate::network::frame::ReplyValue;
use alloc::string::String;
use bytes::Bytes;
use redis_protocol::resp3::types::{Frame as Resp3Frame, FrameMap};

/// Blob string frame of the given data
pub fn blob<T: AsRef<[u8]>>(data: T) -> Resp3Frame {
    Resp3Frame::BlobString {
        data: Bytes::copy_from_slice(data.as_ref()),
        attributes: None,
    }
}

/// Number frame of the given value
pub fn number(data: i64) -> Resp3Frame {
    Resp3Frame::Number { data, attributes: None }
}

/// Typed lookups in map frames, keyed by blob strings
pub struct RespMap<'a> {
    inner: &'a FrameMap,
}

impl<'a> RespMap<'a> {
    pub fn new(inner: &'a FrameMap) -> Self {
        RespMap { inner }
    }

    pub fn find(&self, key: &str) -> Option<&'a Resp3Frame> {
        self.inner.get(&blob(key))
    }

    pub fn find_string(&self, key: &str) -> Option<String> {
        self.find(key)?.to_text()
    }

    pub fn find_integer(&self, key: &str) -> Option<i64> {
        self.find(key)?.to_integer()
    }
}
