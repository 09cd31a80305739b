//! Builder for constructing RESP2/3 command frames
//!
//! All commands of this crate are encoded as multi bulk arrays, e.g.
//! ```
//! use embedded_redis_pubsub::commands::builder::CommandBuilder;
//! use redis_protocol::resp2::types::Frame as Resp2Frame;
//!
//! let _frame: Resp2Frame = CommandBuilder::new("SUBSCRIBE")
//!     .arg_static("first_channel")
//!     .arg_static("second_channel")
//!     .into();
//! ```
//! Arguments are [Bytes](<https://docs.rs/bytes/latest/bytes/>), so payloads are not copied.
use alloc::vec;
use alloc::vec::Vec;
use bytes::Bytes;
use redis_protocol::resp2::types::Frame as Resp2Frame;
use redis_protocol::resp3::types::Frame as Resp3Frame;

/// Builder for constructing RESP2/3 frames
#[derive(Clone, Debug, Default)]
pub struct CommandBuilder {
    pub(crate) elements: Vec<Bytes>,
}

impl CommandBuilder {
    pub fn new(keyword: &'static str) -> Self {
        CommandBuilder {
            elements: vec![Bytes::from_static(keyword.as_bytes())],
        }
    }

    /// Adds a static argument
    pub fn arg_static(mut self, arg: &'static str) -> Self {
        self.elements.push(Bytes::from_static(arg.as_bytes()));
        self
    }

    /// Adds a byte argument
    /// Cloning Bytes is shallow, so the payload is not copied
    pub fn arg(mut self, arg: &Bytes) -> Self {
        self.elements.push(arg.clone());
        self
    }

    /// Just adding the argument if option is Some
    pub fn arg_option(mut self, arg: Option<&Bytes>) -> Self {
        if let Some(inner) = arg {
            self.elements.push(inner.clone());
        }
        self
    }

    /// Adds all given arguments in order
    pub fn args<'b, I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = &'b Bytes>,
    {
        self.elements.extend(args.into_iter().cloned());
        self
    }
}

impl From<CommandBuilder> for Resp2Frame {
    fn from(builder: CommandBuilder) -> Self {
        Resp2Frame::Array(builder.elements.into_iter().map(Resp2Frame::BulkString).collect())
    }
}

impl From<CommandBuilder> for Resp3Frame {
    fn from(builder: CommandBuilder) -> Self {
        let data = builder
            .elements
            .into_iter()
            .map(|data| Resp3Frame::BlobString { data, attributes: None })
            .collect();

        Resp3Frame::Array { data, attributes: None }
    }
}
