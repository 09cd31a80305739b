use crate::commands::auth::AuthCommand;
use crate::commands::hello::{HelloCommand, HelloResponse};
use crate::commands::Command;
use crate::network::connection::Connection;
use crate::network::future::Future;
use crate::network::handler::{ConnectionError, Credentials};
use crate::network::protocol::{Protocol, Resp3};
use crate::network::timeout::{Timeout, TimeoutError};
use alloc::string::String;
use core::fmt::{Debug, Formatter};
use embedded_nal::TcpClientStack;
use embedded_time::duration::Microseconds;
use embedded_time::Clock;

/// Error handling for command execution
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum CommandErrors {
    /// No response within expected time frame
    /// *Is recommended to create a new client/connection in this case*.
    Timeout,
    /// Failed encoding TX command
    EncodingCommandFailed,
    /// Received an invalid response violating the RESP protocol.
    /// *Is recommended to create a new client/connection in this case*.
    ProtocolViolation,
    /// Future is no longer valid. This happens on fatal problems like timeouts or faulty responses, on which
    /// response<->future mapping can no longer be guaranteed
    InvalidFuture,
    /// Low level network error
    TcpError,
    /// Upstream timer/clock failure
    TimerError,
    /// Received an unexpected response incompatible with the command
    CommandResponseViolation,
    /// Redis error response. Inner value is the error message received.
    ErrorResponse(String),
}

/// Client to execute Redis commands
///
/// Commands are sent non-blocking, responses are managed as [Future].
/// A client may be turned into a [PubSubClient](crate::subscription::PubSubClient) for subscriptions.
pub struct Client<'a, N: TcpClientStack, C: Clock, P: Protocol> {
    pub(crate) connection: Connection<'a, N, P>,
    pub(crate) clock: Option<&'a C>,

    /// Max. time waiting for response
    pub(crate) timeout_duration: Microseconds,

    /// Response to HELLO command, only used for RESP3
    pub(crate) hello_response: Option<&'a HelloResponse>,
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> Client<'a, N, C, P>
where
    AuthCommand: Command<<P as Protocol>::FrameType>,
    HelloCommand: Command<<P as Protocol>::FrameType, Response = HelloResponse>,
{
    /// Sends the given command non-blocking
    pub fn send<Cmd>(&'a self, command: Cmd) -> Result<Future<'a, N, C, P, Cmd>, CommandErrors>
    where
        Cmd: Command<P::FrameType>,
    {
        let id = self.connection.send(command.encode())?;

        Ok(Future::new(
            id,
            command,
            self.connection.get_protocol(),
            &self.connection,
            Timeout::new(self.clock, self.timeout_duration)?,
        ))
    }

    /// Authenticates blocking with the given credentials during client initialization
    pub(crate) fn auth(&'a self, credentials: Option<Credentials>) -> Result<(), ConnectionError> {
        if let Some(credentials) = credentials {
            self.send(AuthCommand::from(&credentials))
                .map_err(ConnectionError::AuthenticationError)?
                .wait()
                .map_err(ConnectionError::AuthenticationError)?;
        }

        Ok(())
    }

    /// Prepares the new client by authenticating and switching protocol (HELLO command) if needed
    pub(crate) fn init(&'a self, credentials: Option<Credentials>) -> Result<Option<HelloResponse>, ConnectionError> {
        self.auth(credentials)?;

        if !self.connection.get_protocol().requires_hello() {
            return Ok(None);
        }

        let response = self
            .send(HelloCommand {})
            .map_err(ConnectionError::ProtocolSwitchError)?
            .wait()
            .map_err(ConnectionError::ProtocolSwitchError)?;
        Ok(Some(response))
    }

    /// Waiting on any dropped futures to leave a clean state
    pub fn close(&self) {
        if !self.connection.remaining_dropped_futures() {
            return;
        }

        let timer = match Timeout::new(self.clock, self.timeout_duration) {
            Ok(timer) => timer,
            Err(_) => return,
        };

        while self.connection.remaining_dropped_futures() && !timer.expired().unwrap_or(true) {
            self.connection.handle_dropped_futures();
        }
    }
}

impl<'a, N: TcpClientStack, C: Clock> Client<'a, N, C, Resp3> {
    /// Returns the response to HELLO command executed during connection initialization
    pub fn get_hello_response(&self) -> Option<&HelloResponse> {
        self.hello_response
    }
}

impl From<TimeoutError> for CommandErrors {
    fn from(_: TimeoutError) -> Self {
        CommandErrors::TimerError
    }
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> Debug for Client<'a, N, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("connection", &self.connection)
            .field("timeout_duration", &self.timeout_duration)
            .finish()
    }
}
