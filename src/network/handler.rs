use crate::commands::auth::AuthCommand;
use crate::commands::hello::{HelloCommand, HelloResponse};
use crate::commands::Command;
use crate::network::client::{Client, CommandErrors};
use crate::network::connection::Connection;
use crate::network::protocol::{Protocol, Resp2, Resp3};
use alloc::string::{String, ToString};
use embedded_nal::SocketAddr;
use embedded_nal::TcpClientStack;
use embedded_time::duration::Extensions;
use embedded_time::duration::Microseconds;
use embedded_time::Clock;
use tracing::{debug, warn};

/// Error handling for connection management
#[derive(Debug, PartialEq)]
pub enum ConnectionError {
    /// Unable to get a socket from network layer
    TcpSocketError,

    /// TCP Connect failed
    TcpConnectionFailed,

    /// Authentication failed with the given sub error
    AuthenticationError(CommandErrors),

    /// Protocol switch (switch to RESP3) failed with the given sub error
    ProtocolSwitchError(CommandErrors),
}

/// Authentication credentials
#[derive(Clone)]
pub struct Credentials {
    pub(crate) username: Option<String>,
    pub(crate) password: String,
}

impl Credentials {
    /// Uses ACL based authentication
    /// Required Redis version >= 6 + ACL enabled
    pub fn acl(username: &str, password: &str) -> Self {
        Credentials {
            username: Some(username.to_string()),
            password: password.to_string(),
        }
    }

    /// Uses password-only authentication.
    /// This form just authenticates against the password set with requirepass (Redis server conf)
    pub fn password_only(password: &str) -> Self {
        Self {
            username: None,
            password: password.to_string(),
        }
    }
}

/// Connection handler for Redis client
///
/// Caches the socket, so creating short-lived clients is cheap. A subscribed connection is
/// meant to be long-lived: turn the client into a [PubSubClient](crate::subscription::PubSubClient)
/// and keep it as long as subscriptions are needed. Publishing and introspection commands can be
/// executed by clients of a second handler.
pub struct ConnectionHandler<N: TcpClientStack, P: Protocol> {
    /// Network details of Redis server
    remote: SocketAddr,

    /// Authentication credentials. None in case of no authentication.
    authentication: Option<Credentials>,

    /// Cached socket
    socket: Option<N::TcpSocket>,

    /// Max. duration waiting for Redis responses. Zero disables the timeout.
    timeout: Microseconds,

    /// Redis protocol
    /// RESP3 requires Redis version >= 6.0
    protocol: P,

    /// Response to HELLO command, only used for RESP3
    hello_response: Option<HelloResponse>,
}

impl<N: TcpClientStack> ConnectionHandler<N, Resp2> {
    /// Creates a new connection handler using RESP2 protocol
    pub fn resp2(remote: SocketAddr) -> ConnectionHandler<N, Resp2> {
        ConnectionHandler::new(remote, Resp2 {})
    }
}

impl<N: TcpClientStack> ConnectionHandler<N, Resp3> {
    /// Creates a new connection handler using RESP3 protocol
    pub fn resp3(remote: SocketAddr) -> ConnectionHandler<N, Resp3> {
        ConnectionHandler::new(remote, Resp3 {})
    }
}

impl<N: TcpClientStack, P: Protocol> ConnectionHandler<N, P>
where
    AuthCommand: Command<<P as Protocol>::FrameType>,
    HelloCommand: Command<<P as Protocol>::FrameType, Response = HelloResponse>,
{
    fn new(remote: SocketAddr, protocol: P) -> Self {
        ConnectionHandler {
            remote,
            authentication: None,
            socket: None,
            timeout: 0.microseconds(),
            protocol,
            hello_response: None,
        }
    }

    /// Returns a Redis client. Caches the connection for future reuse.
    /// The client has the same lifetime as the network reference.
    ///
    /// Authentication and protocol switch are done automatically when creating a new connection.
    /// So the caller can expect an already authenticated and ready to use client.
    /// In case initialization fails, the new socket is closed again.
    ///
    /// The cached socket is not checked for liveness. After a [PubSubClient](crate::subscription::PubSubClient)
    /// failed (network error, undecodable data) or was closed without all unsubscriptions being confirmed,
    /// call [disconnect()](Self::disconnect) before connecting again. Otherwise the dead or still subscribed
    /// socket is reused.
    pub fn connect<'a, C: Clock>(
        &'a mut self,
        network: &'a mut N,
        clock: Option<&'a C>,
    ) -> Result<Client<'a, N, C, P>, ConnectionError> {
        if self.socket.is_none() {
            self.hello_response = self.new_socket(network, clock)?;
        }

        let socket = self.socket.as_mut().ok_or(ConnectionError::TcpSocketError)?;
        Ok(Client {
            connection: Connection::new(network, socket, self.protocol.clone()),
            timeout_duration: self.timeout,
            clock,
            hello_response: self.hello_response.as_ref(),
        })
    }

    /// Closes the cached socket
    pub fn disconnect(&mut self, network: &mut N) {
        if let Some(socket) = self.socket.take() {
            let _ = network.close(socket);
        }

        self.hello_response = None;
    }

    /// Sets the max. duration waiting for Redis responses
    pub fn timeout(&mut self, timeout: Microseconds) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Sets the authentication credentials
    pub fn auth(&mut self, credentials: Credentials) -> &mut Self {
        self.authentication = Some(credentials);
        self
    }

    /// Connects a new socket, authenticates and switches protocol if needed.
    /// The socket is cached on success.
    fn new_socket<C: Clock>(
        &mut self,
        network: &mut N,
        clock: Option<&C>,
    ) -> Result<Option<HelloResponse>, ConnectionError> {
        let mut socket = network.socket().map_err(|_| {
            warn!("Creating TCP socket failed");
            ConnectionError::TcpSocketError
        })?;

        if network.connect(&mut socket, self.remote).is_err() {
            warn!(remote = %self.remote, "TCP connection failed");
            let _ = network.close(socket);
            return Err(ConnectionError::TcpConnectionFailed);
        }

        let result = {
            let client = Client {
                connection: Connection::new(&mut *network, &mut socket, self.protocol.clone()),
                timeout_duration: self.timeout,
                clock,
                hello_response: None,
            };
            client.init(self.authentication.clone())
        };

        match result {
            Ok(response) => {
                debug!(remote = %self.remote, "Connected to Redis");
                self.socket = Some(socket);
                Ok(response)
            }
            Err(error) => {
                warn!(?error, "Connection initialization failed");
                let _ = network.close(socket);
                Err(error)
            }
        }
    }
}
