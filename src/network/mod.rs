pub use client::{Client, CommandErrors};
pub use frame::ReplyValue;
pub use future::Future;
pub use handler::{ConnectionError, ConnectionHandler, Credentials};
pub use protocol::{Protocol, Resp2, Resp3};

pub(crate) mod client;
pub(crate) mod connection;
pub(crate) mod frame;
pub(crate) mod future;
pub(crate) mod handler;
pub(crate) mod protocol;
pub(crate) mod response;
pub(crate) mod timeout;
