//! Abstraction of PUBSUB introspection commands.
//!
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/pubsub/>).
//!
//! * [PubSubChannelsCommand]: `PUBSUB CHANNELS [pattern]`, the active channels (having at least one subscriber)
//! * [PubSubNumSubCommand]: `PUBSUB NUMSUB [channel ...]`, subscriber count per channel in request order
//! * [PubSubNumPatCommand]: `PUBSUB NUMPAT`, the number of pattern subscriptions of all clients
//!
//! ```no_run
//!# use core::str::FromStr;
//!# use embedded_nal::SocketAddr;
//!# use std_embedded_nal::Stack;
//!# use std_embedded_time::StandardClock;
//!# use embedded_redis_pubsub::network::ConnectionHandler;
//!#
//!# let mut stack = Stack::default();
//!# let clock = StandardClock::default();
//!#
//!# let mut connection_handler = ConnectionHandler::resp2(SocketAddr::from_str("127.0.0.1:6379").unwrap());
//!# let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap();
//!#
//! let channels = client.pubsub_channels(Some("news.*")).unwrap().wait().unwrap();
//! let counts = client.pubsub_numsub(["news.tech", "news.art"]).unwrap().wait().unwrap();
//! assert_eq!(2, counts.len());
//!
//! let patterns = client.pubsub_numpat().unwrap().wait().unwrap();
//! ```
use crate::commands::auth::AuthCommand;
use crate::commands::builder::CommandBuilder;
use crate::commands::hello::{HelloCommand, HelloResponse};
use crate::commands::{Command, ResponseTypeError};
use crate::network::client::{Client, CommandErrors};
use crate::network::frame::ReplyValue;
use crate::network::future::Future;
use crate::network::protocol::Protocol;
use alloc::vec::Vec;
use bytes::Bytes;
use embedded_nal::TcpClientStack;
use embedded_time::Clock;

/// Abstraction for PUBSUB CHANNELS command
pub struct PubSubChannelsCommand {
    /// Optional glob-style pattern. All active channels are returned if None.
    pattern: Option<Bytes>,
}

impl PubSubChannelsCommand {
    pub fn new<T>(pattern: Option<T>) -> Self
    where
        Bytes: From<T>,
    {
        PubSubChannelsCommand {
            pattern: pattern.map(Bytes::from),
        }
    }
}

impl<F> Command<F> for PubSubChannelsCommand
where
    F: From<CommandBuilder> + ReplyValue,
{
    /// Names of the active channels
    type Response = Vec<Bytes>;

    fn encode(&self) -> F {
        CommandBuilder::new("PUBSUB")
            .arg_static("CHANNELS")
            .arg_option(self.pattern.as_ref())
            .into()
    }

    fn eval_response(&self, frame: F) -> Result<Self::Response, ResponseTypeError> {
        frame
            .elements()
            .ok_or(ResponseTypeError {})?
            .iter()
            .map(|channel| channel.to_bytes_value().ok_or(ResponseTypeError {}))
            .collect()
    }
}

/// Abstraction for PUBSUB NUMSUB command
pub struct PubSubNumSubCommand {
    channels: Vec<Bytes>,
}

impl PubSubNumSubCommand {
    pub fn new<I, T>(channels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        PubSubNumSubCommand {
            channels: channels.into_iter().map(Bytes::from).collect(),
        }
    }
}

impl<F> Command<F> for PubSubNumSubCommand
where
    F: From<CommandBuilder> + ReplyValue,
{
    /// (channel, subscriber count) pairs in request order
    type Response = Vec<(Bytes, i64)>;

    fn encode(&self) -> F {
        CommandBuilder::new("PUBSUB")
            .arg_static("NUMSUB")
            .args(&self.channels)
            .into()
    }

    fn eval_response(&self, frame: F) -> Result<Self::Response, ResponseTypeError> {
        let elements = frame.elements().ok_or(ResponseTypeError {})?;
        if elements.len() % 2 != 0 {
            return Err(ResponseTypeError {});
        }

        elements
            .chunks_exact(2)
            .map(|pair| {
                let channel = pair[0].to_bytes_value().ok_or(ResponseTypeError {})?;
                let count = pair[1].to_integer().ok_or(ResponseTypeError {})?;
                Ok((channel, count))
            })
            .collect()
    }
}

/// Abstraction for PUBSUB NUMPAT command
pub struct PubSubNumPatCommand {}

impl<F> Command<F> for PubSubNumPatCommand
where
    F: From<CommandBuilder> + ReplyValue,
{
    /// Number of pattern subscriptions of all clients
    type Response = i64;

    fn encode(&self) -> F {
        CommandBuilder::new("PUBSUB").arg_static("NUMPAT").into()
    }

    fn eval_response(&self, frame: F) -> Result<Self::Response, ResponseTypeError> {
        frame.to_integer().ok_or(ResponseTypeError {})
    }
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> Client<'a, N, C, P>
where
    AuthCommand: Command<<P as Protocol>::FrameType>,
    HelloCommand: Command<<P as Protocol>::FrameType, Response = HelloResponse>,
    <P as Protocol>::FrameType: From<CommandBuilder>,
{
    /// Shorthand for [PubSubChannelsCommand]
    pub fn pubsub_channels<T>(
        &'a self,
        pattern: Option<T>,
    ) -> Result<Future<'a, N, C, P, PubSubChannelsCommand>, CommandErrors>
    where
        Bytes: From<T>,
    {
        self.send(PubSubChannelsCommand::new(pattern))
    }

    /// Shorthand for [PubSubNumSubCommand]
    pub fn pubsub_numsub<I, T>(&'a self, channels: I) -> Result<Future<'a, N, C, P, PubSubNumSubCommand>, CommandErrors>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        self.send(PubSubNumSubCommand::new(channels))
    }

    /// Shorthand for [PubSubNumPatCommand]
    pub fn pubsub_numpat(&'a self) -> Result<Future<'a, N, C, P, PubSubNumPatCommand>, CommandErrors> {
        self.send(PubSubNumPatCommand {})
    }
}
