use crate::commands::auth::AuthCommand;
use crate::commands::builder::CommandBuilder;
use crate::commands::hello::{HelloCommand, HelloResponse};
use crate::commands::publish::PublishCommand;
use crate::commands::pubsub::{PubSubChannelsCommand, PubSubNumPatCommand, PubSubNumSubCommand};
use crate::commands::Command;
use crate::network::connection::Connection;
use crate::network::protocol::Protocol;
use crate::network::timeout::Timeout;
use crate::network::{Client, CommandErrors};
use crate::subscription::messages::{Message, Transition};
use crate::subscription::pending::{PendingOperation, PendingQueue, Remaining, RequestOperation, Slot, TransitionOperation};
use crate::subscription::registry::{Handler, Kind, Registry};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use bytes::Bytes;
use core::cell::{Cell, RefCell};
use core::fmt::{Debug, Formatter};
use embedded_nal::TcpClientStack;
use embedded_time::duration::Microseconds;
use embedded_time::Clock;
use tracing::{debug, warn};

/// Subscription errors
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Error {
    /// The client was closed or the connection failed before
    NotConnected,
    /// Redis sent a frame violating the pub/sub message format
    ProtocolError,
    /// Connection failed or was closed while the operation was pending
    ConnectionClosed,
    /// Redis rejected the command. Inner value is the error message received.
    ServerError(String),
    /// Subscribe commands require at least one channel or pattern
    MissingArguments,
    /// Local error while encoding or sending the command
    CommandError(CommandErrors),
}

impl From<CommandErrors> for Error {
    fn from(error: CommandErrors) -> Self {
        match error {
            CommandErrors::ErrorResponse(message) => Error::ServerError(message),
            CommandErrors::TcpError => Error::ConnectionClosed,
            CommandErrors::CommandResponseViolation | CommandErrors::ProtocolViolation => Error::ProtocolError,
            error => Error::CommandError(error),
        }
    }
}

/// Source of progress for completions
pub(crate) trait Drive {
    /// Receives and routes all pending frames without blocking
    fn drive(&self) -> Result<(), Error>;
}

/// Non-blocking result of a pub/sub operation
///
/// Resolved exactly once by the message router, either with a value, a server error, a protocol error
/// or [Error::ConnectionClosed]. Dropping an unresolved completion does not cancel the command.
pub struct Completion<'s, T> {
    slot: Slot<T>,
    driver: &'s dyn Drive,
}

impl<'s, T> Completion<'s, T> {
    pub(crate) fn new(slot: Slot<T>, driver: &'s dyn Drive) -> Self {
        Self { slot, driver }
    }

    /// Blocks until the operation is resolved. Messages received meanwhile are dispatched to their handlers.
    ///
    /// No timeout is applied, the call returns at the latest when the connection fails.
    pub fn wait(self) -> Result<T, Error> {
        loop {
            if let Some(result) = self.slot.borrow_mut().take() {
                return result;
            }

            // Teardown resolves every pending slot, so errors are picked up on next iteration
            if let Err(error) = self.driver.drive() {
                if let Some(result) = self.slot.borrow_mut().take() {
                    return result;
                }
                return Err(error);
            }
        }
    }

    /// Non blocking method for checking if the result is available
    /// So if true is returned, wait() is non-blocking
    pub fn ready(&mut self) -> bool {
        if !self.is_resolved() {
            // Teardown resolves every pending slot, so the error is reported by is_resolved()
            let _ = self.driver.drive();
        }

        self.is_resolved()
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<T> Debug for Completion<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Completion").field("resolved", &self.is_resolved()).finish()
    }
}

/// Client of a subscribed connection
///
/// Created by [Client::pubsub]. Takes over the connection of the client: subscribe commands, their
/// confirmations and published messages share one ordered stream, which is consumed by [poll()](Self::poll).
///
/// All commands return a [Completion] immediately. Completions are resolved in command order.
pub struct PubSubClient<'a, N: TcpClientStack, C: Clock, P: Protocol>
where
    P::FrameType: From<CommandBuilder>,
{
    pub(crate) connection: Connection<'a, N, P>,
    clock: Option<&'a C>,

    /// Max. time waiting for unsubscribe confirmations when closing
    timeout_duration: Microseconds,

    pub(crate) registry: RefCell<Registry<'a>>,
    pub(crate) pending: RefCell<PendingQueue<'a, P::FrameType>>,
    pub(crate) connected: Cell<bool>,
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> PubSubClient<'a, N, C, P>
where
    P::FrameType: From<CommandBuilder>,
{
    pub(crate) fn new(connection: Connection<'a, N, P>, clock: Option<&'a C>, timeout_duration: Microseconds) -> Self {
        Self {
            connection,
            clock,
            timeout_duration,
            registry: RefCell::new(Registry::new()),
            pending: RefCell::new(PendingQueue::new()),
            connected: Cell::new(true),
        }
    }

    /// Subscribes to the given channels. The handler is invoked for every message published to any of them.
    ///
    /// The completion resolves after Redis confirmed every channel. Subscribing to an already
    /// subscribed channel replaces its handler.
    pub fn subscribe<I, T, H>(&self, channels: I, handler: H) -> Result<Completion<'_, ()>, Error>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
        H: FnMut(&Message) + 'a,
    {
        self.subscribe_handler(Transition::Subscribe, Self::collect(channels), handler)
    }

    /// Subscribes to the given glob-style patterns
    ///
    /// The handler is invoked for every message of a channel matching one of them. [Message::pattern] contains
    /// the matching pattern.
    pub fn psubscribe<I, T, H>(&self, patterns: I, handler: H) -> Result<Completion<'_, ()>, Error>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
        H: FnMut(&Message) + 'a,
    {
        self.subscribe_handler(Transition::PSubscribe, Self::collect(patterns), handler)
    }

    /// Unsubscribes from the given channels. An empty list unsubscribes from all channels.
    pub fn unsubscribe<I, T>(&self, channels: I) -> Result<Completion<'_, ()>, Error>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        self.transition(Transition::Unsubscribe, Self::collect(channels), None)
    }

    /// Unsubscribes from all channels
    ///
    /// Resolves once no channel subscription is left. Pattern subscriptions are not affected.
    pub fn unsubscribe_all(&self) -> Result<Completion<'_, ()>, Error> {
        self.transition(Transition::Unsubscribe, Vec::new(), None)
    }

    /// Unsubscribes from the given patterns. An empty list unsubscribes from all patterns.
    pub fn punsubscribe<I, T>(&self, patterns: I) -> Result<Completion<'_, ()>, Error>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        self.transition(Transition::PUnsubscribe, Self::collect(patterns), None)
    }

    /// Unsubscribes from all patterns
    pub fn punsubscribe_all(&self) -> Result<Completion<'_, ()>, Error> {
        self.transition(Transition::PUnsubscribe, Vec::new(), None)
    }

    /// Publishes the message. Resolves to the number of clients that received it.
    ///
    /// *RESP2 connections only accept subscribe commands once subscribed. Redis rejects
    /// PUBLISH and PUBSUB in this state, which resolves the completion with [Error::ServerError].*
    pub fn publish<K, V>(&self, channel: K, message: V) -> Result<Completion<'_, i64>, Error>
    where
        Bytes: From<K>,
        Bytes: From<V>,
    {
        self.request(PublishCommand::new(channel, message))
    }

    /// Active channels of the server, optionally filtered by a glob-style pattern
    pub fn pubsub_channels<T>(&self, pattern: Option<T>) -> Result<Completion<'_, Vec<Bytes>>, Error>
    where
        Bytes: From<T>,
    {
        self.request(PubSubChannelsCommand::new(pattern))
    }

    /// Subscriber count per channel, in request order
    pub fn pubsub_numsub<I, T>(&self, channels: I) -> Result<Completion<'_, Vec<(Bytes, i64)>>, Error>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        self.request(PubSubNumSubCommand::new(channels))
    }

    /// Number of pattern subscriptions of all clients
    pub fn pubsub_numpat(&self) -> Result<Completion<'_, i64>, Error> {
        self.request(PubSubNumPatCommand {})
    }

    /// Number of confirmed channel subscriptions
    pub fn channel_count(&self) -> usize {
        self.registry.borrow().channel_count()
    }

    /// Number of confirmed pattern subscriptions
    pub fn pattern_count(&self) -> usize {
        self.registry.borrow().pattern_count()
    }

    /// True if the channel or pattern subscription is confirmed
    pub fn is_subscribed<T>(&self, kind: Kind, name: T) -> bool
    where
        T: AsRef<[u8]>,
    {
        self.registry.borrow().contains(kind, name.as_ref())
    }

    /// False after the connection failed or the client was closed
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// Unsubscribes from everything still subscribed and detaches from the connection
    ///
    /// Waits for the unsubscribe confirmations (bounded by the timeout of the connection handler), so
    /// the socket is left in a clean state. Afterwards all pending operations are failed with
    /// [Error::ConnectionClosed] and every further operation fails with [Error::NotConnected].
    ///
    /// If [is_connected()](Self::is_connected) was false before or the unsubscriptions timed out, the socket
    /// has to be dropped with [ConnectionHandler::disconnect](crate::network::ConnectionHandler::disconnect).
    pub fn close(&self) {
        if !self.connected.get() {
            return;
        }

        self.unsubscribe_remaining();
        self.teardown();
    }

    /// Best effort unsubscription of all confirmed channels and patterns
    fn unsubscribe_remaining(&self) {
        let timeout = match Timeout::new(self.clock, self.timeout_duration) {
            Ok(timeout) => timeout,
            Err(_) => return,
        };

        let mut completions = Vec::new();
        if self.channel_count() > 0 {
            completions.extend(self.unsubscribe_all().ok());
        }
        if self.pattern_count() > 0 {
            completions.extend(self.punsubscribe_all().ok());
        }

        while completions.iter().any(|completion| !completion.is_resolved()) {
            if timeout.expired().unwrap_or(true) {
                warn!("Unsubscription not confirmed in time");
                return;
            }

            if self.poll().is_err() {
                return;
            }
        }
    }

    /// Drops the subscription state and fails all pending operations
    pub(crate) fn teardown(&self) {
        if !self.connected.replace(false) {
            return;
        }

        self.registry.borrow_mut().clear();
        let operations = self.pending.borrow_mut().drain();
        debug!(pending = operations.len(), "Pub/sub connection closed");

        for operation in operations {
            operation.fail(Error::ConnectionClosed);
        }
    }

    pub(crate) fn assert_connected(&self) -> Result<(), Error> {
        if !self.connected.get() {
            return Err(Error::NotConnected);
        }

        Ok(())
    }

    fn subscribe_handler<H>(&self, transition: Transition, names: Vec<Bytes>, handler: H) -> Result<Completion<'_, ()>, Error>
    where
        H: FnMut(&Message) + 'a,
    {
        if names.is_empty() {
            return Err(Error::MissingArguments);
        }

        let handler: Handler<'a> = Rc::new(RefCell::new(handler));
        self.transition(transition, names, Some(handler))
    }

    /// Sends a (p)subscribe or (p)unsubscribe command and queues its confirmations
    fn transition(
        &self,
        transition: Transition,
        names: Vec<Bytes>,
        handler: Option<Handler<'a>>,
    ) -> Result<Completion<'_, ()>, Error> {
        self.assert_connected()?;

        let remaining = match names.len() {
            0 => Remaining::UntilEmpty,
            count => Remaining::Exactly(count),
        };

        self.send(CommandBuilder::new(transition.keyword()).args(&names).into())?;

        let slot: Slot<()> = Rc::new(RefCell::new(None));
        self.pending
            .borrow_mut()
            .push(PendingOperation::Transition(TransitionOperation::new(
                transition,
                handler,
                remaining,
                slot.clone(),
            )));

        debug!(command = transition.keyword(), identifiers = names.len(), "Sent subscription command");
        Ok(Completion::new(slot, self))
    }

    /// Sends a command answered by a single reply and queues its evaluation
    fn request<Cmd>(&self, command: Cmd) -> Result<Completion<'_, Cmd::Response>, Error>
    where
        Cmd: Command<P::FrameType> + 'a,
        Cmd::Response: 'a,
    {
        self.assert_connected()?;
        self.send(command.encode())?;

        let slot: Slot<Cmd::Response> = Rc::new(RefCell::new(None));
        let target = slot.clone();

        // Error replies are already mapped by the router
        let resolve = move |result: Result<P::FrameType, Error>| {
            let result = result.and_then(|frame| command.eval_response(frame).map_err(|_| Error::ProtocolError));
            *target.borrow_mut() = Some(result);
        };

        self.pending
            .borrow_mut()
            .push(PendingOperation::Request(RequestOperation::new(Box::new(resolve))));
        Ok(Completion::new(slot, self))
    }

    /// Writes the frame. A failed write tears the connection down.
    fn send(&self, frame: P::FrameType) -> Result<(), Error> {
        match self.connection.send_frame(frame) {
            Ok(()) => Ok(()),
            Err(CommandErrors::TcpError) => {
                warn!("Sending pub/sub command failed");
                self.teardown();
                Err(Error::ConnectionClosed)
            }
            Err(error) => Err(Error::CommandError(error)),
        }
    }

    fn collect<I, T>(names: I) -> Vec<Bytes>
    where
        I: IntoIterator<Item = T>,
        Bytes: From<T>,
    {
        names.into_iter().map(Bytes::from).collect()
    }
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> Drive for PubSubClient<'a, N, C, P>
where
    P::FrameType: From<CommandBuilder>,
{
    fn drive(&self) -> Result<(), Error> {
        self.poll().map(|_| ())
    }
}

impl<N: TcpClientStack, C: Clock, P: Protocol> Drop for PubSubClient<'_, N, C, P>
where
    P::FrameType: From<CommandBuilder>,
{
    fn drop(&mut self) {
        self.close();
    }
}

impl<N: TcpClientStack, C: Clock, P: Protocol> Debug for PubSubClient<'_, N, C, P>
where
    P::FrameType: From<CommandBuilder>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PubSubClient")
            .field("connection", &self.connection)
            .field("registry", &self.registry.borrow())
            .field("pending", &self.pending.borrow().len())
            .field("connected", &self.connected.get())
            .finish()
    }
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> Client<'a, N, C, P>
where
    AuthCommand: Command<<P as Protocol>::FrameType>,
    HelloCommand: Command<<P as Protocol>::FrameType, Response = HelloResponse>,
    <P as Protocol>::FrameType: From<CommandBuilder>,
{
    /// Turns the client into a [PubSubClient]
    ///
    /// Responses of dropped futures are awaited first, so the subscribed stream starts clean.
    pub fn pubsub(self) -> PubSubClient<'a, N, C, P> {
        self.close();

        let Client {
            connection,
            clock,
            timeout_duration,
            hello_response: _,
        } = self;

        PubSubClient::new(connection, clock, timeout_duration)
    }
}
