use crate::commands::Command;
use crate::network::client::CommandErrors;
use crate::network::connection::Connection;
use crate::network::protocol::Protocol;
use crate::network::timeout::Timeout;
use embedded_nal::TcpClientStack;
use embedded_time::Clock;

#[derive(Clone, Debug)]
pub(crate) struct Identity {
    /// Used for invalidating futures
    /// Gets incremented on fatal problems like timeouts or faulty responses
    pub series: usize,

    /// Unique index mapping the future to its response frame
    pub index: usize,
}

/// Non-blocking response management of request/response commands
pub struct Future<'a, N: TcpClientStack, C: Clock, P: Protocol, Cmd: Command<P::FrameType>> {
    id: Identity,
    command: Cmd,
    protocol: P,
    connection: &'a Connection<'a, N, P>,
    timeout: Timeout<'a, C>,

    /// Cached error during work of ready(). Will be returned on wait() call.
    error: Option<CommandErrors>,

    /// Was wait called? Flag is used for destructor.
    wait_called: bool,
}

impl<'a, N: TcpClientStack, C: Clock, P: Protocol, Cmd: Command<P::FrameType>> Future<'a, N, C, P, Cmd> {
    pub(crate) fn new(
        id: Identity,
        command: Cmd,
        protocol: P,
        connection: &'a Connection<'a, N, P>,
        timeout: Timeout<'a, C>,
    ) -> Future<'a, N, C, P, Cmd> {
        Self {
            id,
            command,
            protocol,
            connection,
            timeout,
            error: None,
            wait_called: false,
        }
    }

    /// Blocks until response is received and returns the response
    /// Throws an error on invalid response or timeout (if configured)
    pub fn wait(mut self) -> Result<Cmd::Response, CommandErrors> {
        self.wait_called = true;

        if let Some(error) = self.error.take() {
            return Err(error);
        }

        self.process(true)?;

        let frame = self.connection.take_frame(&self.id).ok_or(CommandErrors::InvalidFuture)?;
        self.protocol.assert_error(&frame)?;

        self.command
            .eval_response(frame)
            .map_err(|_| CommandErrors::CommandResponseViolation)
    }

    /// Non blocking method for checking if data is ready
    /// So if true is returned, wait() is non-blocking
    /// Errors are preserved and returned on wait() call
    pub fn ready(&mut self) -> bool {
        let result = self
            .process(false)
            .and_then(|_| self.connection.is_complete(&self.id));

        match result {
            Ok(complete) => complete,
            Err(error) => {
                self.error = Some(error);
                true
            }
        }
    }

    /// Processes socket data
    /// If block=false, only pending data is read without blocking
    fn process(&mut self, block: bool) -> Result<(), CommandErrors> {
        while !self.connection.is_complete(&self.id)? {
            match self.connection.receive_chunk() {
                Ok(()) => {}
                Err(nb::Error::Other(_)) => return Err(CommandErrors::TcpError),
                Err(nb::Error::WouldBlock) => {
                    if self.timeout.expired()? {
                        self.connection.invalidate_futures();
                        return Err(CommandErrors::Timeout);
                    }

                    if !block {
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }
}

impl<N: TcpClientStack, C: Clock, P: Protocol, Cmd: Command<P::FrameType>> Drop for Future<'_, N, C, P, Cmd> {
    fn drop(&mut self) {
        if !self.wait_called {
            self.connection.drop_future(self.id.clone());
        }
    }
}
