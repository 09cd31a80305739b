//! # Publish/Subscribe client
//!
//! Subscriptions to channels and glob-style patterns (s. [Redis Pub/Sub](https://redis.io/docs/manual/pubsub/)).
//!
//! A regular client is turned into a [PubSubClient], which owns the connection from then on.
//! Every subscribe call registers a handler, which is invoked for each message of the subscribed
//! channels or patterns.
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
//!# let server_address = SocketAddr::from_str("127.0.0.1:6379").unwrap();
//!# let mut connection_handler = ConnectionHandler::resp3(server_address);
//! let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap().pubsub();
//!
//! client
//!     .subscribe(["first_channel", "second_channel"], |message| {
//!         // message.channel, message.payload
//!     })
//!     .unwrap()
//!     .wait()
//!     .unwrap();
//!
//! client
//!     .psubscribe(["sensor.*"], |message| {
//!         // message.pattern == Some("sensor.*")
//!     })
//!     .unwrap()
//!     .wait()
//!     .unwrap();
//!
//! assert_eq!(2, client.channel_count());
//! ```
//!
//! If a subscription fails, it's recommended to close the connection, as the
//! state is undefined. A further reuse of the connection could cause subsequent errors.
//!
//! ## Receiving messages
//!
//! Messages are dispatched while the client receives data. [poll()](PubSubClient::poll) routes all
//! pending frames without blocking, [run()](PubSubClient::run) loops until the connection fails.
//! Waiting for any [Completion] dispatches messages as well.
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
//!# let server_address = SocketAddr::from_str("127.0.0.1:6379").unwrap();
//!# let mut connection_handler = ConnectionHandler::resp3(server_address);
//!# let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap().pubsub();
//!#
//! client.subscribe(["first_channel"], |message| {
//!     assert_eq!("example payload", core::str::from_utf8(&message.payload[..]).unwrap());
//! }).unwrap();
//!
//! loop {
//!     client.poll().unwrap();
//! }
//! ```
//!
//! ## Unsubscribing
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
//!# let server_address = SocketAddr::from_str("127.0.0.1:6379").unwrap();
//!# let mut connection_handler = ConnectionHandler::resp3(server_address);
//!# let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap().pubsub();
//!# client.subscribe(["first_channel", "second_channel"], |_| {}).unwrap().wait().unwrap();
//!#
//! client.unsubscribe(["first_channel"]).unwrap().wait().unwrap();
//! client.unsubscribe_all().unwrap().wait().unwrap();
//! assert_eq!(0, client.channel_count());
//! ```
//!
//! *Note: remaining subscriptions are unsubscribed automatically when the client is dropped*
//!
//! ## Publishing
//!
//! RESP2 connections reject all non-subscription commands once subscribed. So publishing and
//! PUBSUB introspection are done on a second, regular connection. On RESP3 connections
//! [PubSubClient] accepts them as well.
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
//!# let server_address = SocketAddr::from_str("127.0.0.1:6379").unwrap();
//!# let mut connection_handler = ConnectionHandler::resp3(server_address);
//!# let client = connection_handler.connect(&mut stack, Some(&clock)).unwrap().pubsub();
//!#
//! let receivers = client.publish("first_channel", "example payload").unwrap().wait().unwrap();
//! let channels = client.pubsub_channels(Some("first_*")).unwrap().wait().unwrap();
//! ```
pub use client::{Completion, Error, PubSubClient};
pub use messages::{DecodeError, Message, PushMessage, ToPushMessage, Transition};
pub use registry::{Handler, Kind, Registry};

pub(crate) mod client;
pub(crate) mod messages;
pub mod pattern;
pub(crate) mod pending;
pub(crate) mod registry;
pub(crate) mod router;

#[cfg(test)]
mod tests;
