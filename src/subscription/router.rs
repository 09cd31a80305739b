use crate::commands::builder::CommandBuilder;
use crate::network::frame::ReplyValue;
use crate::network::protocol::Protocol;
use crate::subscription::client::{Error, PubSubClient};
use crate::subscription::messages::{DecodeError, Message, PushMessage, ToPushMessage, Transition};
use bytes::Bytes;
use embedded_nal::TcpClientStack;
use embedded_time::Clock;
use tracing::{debug, warn};

impl<'a, N: TcpClientStack, C: Clock, P: Protocol> PubSubClient<'a, N, C, P>
where
    P::FrameType: From<CommandBuilder>,
{
    /// Receives all pending data and routes every complete frame without blocking
    ///
    /// Confirmations and replies resolve the pending operations in command order, published messages
    /// are dispatched to their handlers. Returns the number of routed frames.
    ///
    /// A network failure or undecodable data tears the connection down and returns [Error::ConnectionClosed].
    pub fn poll(&self) -> Result<usize, Error> {
        self.assert_connected()?;

        if self.connection.receive_pending().is_err() {
            warn!("Receiving pub/sub data failed");
            self.teardown();
            return Err(Error::ConnectionClosed);
        }

        let mut routed = 0;
        while let Some(frame) = self.connection.take_next_frame() {
            self.route(frame);
            routed += 1;
        }

        if self.connection.is_faulty() {
            warn!("Received data violating the RESP protocol");
            self.teardown();
            return Err(Error::ConnectionClosed);
        }

        Ok(routed)
    }

    /// Routes frames until the connection fails or the client is closed
    ///
    /// Returns the error terminating the loop.
    pub fn run(&self) -> Error {
        loop {
            if let Err(error) = self.poll() {
                return error;
            }
        }
    }

    fn route(&self, frame: P::FrameType) {
        match frame.decode_push() {
            Ok(PushMessage::Message(message)) => self.dispatch(message),
            Ok(PushMessage::Confirmation {
                transition,
                name,
                count,
            }) => {
                debug!(command = transition.keyword(), ?name, count, "Received confirmation");
                self.confirm(transition, name, None);
            }
            Err(DecodeError::NoPushMessage) => self.reply(frame),
            // RESP2 replies are plain arrays and may look like malformed push messages
            Err(_) if !frame.is_push() && self.pending.borrow().head_is_request() => self.reply(frame),
            Err(DecodeError::MalformedConfirmation(transition, name)) => {
                warn!(command = transition.keyword(), ?name, "Received malformed confirmation");
                self.confirm(transition, name, Some(Error::ProtocolError));
            }
            Err(error) => warn!(?error, "Ignoring unexpected push message"),
        }
    }

    /// Invokes the handler of the channel, respectively of the pattern echoed by pmessage
    fn dispatch(&self, message: Message) {
        let handler = {
            let registry = self.registry.borrow();
            match &message.pattern {
                Some(pattern) => registry.pattern_handler(pattern),
                None => registry.channel_handler(&message.channel),
            }
        };

        let handler = match handler {
            Some(handler) => handler,
            None => {
                warn!(channel = ?message.channel, pattern = ?message.pattern, "Dropping message of unknown subscription");
                return;
            }
        };

        debug!(channel = ?message.channel, pattern = ?message.pattern, "Dispatching message");
        match handler.try_borrow_mut() {
            Ok(mut callback) => (&mut *callback)(&message),
            Err(_) => warn!(channel = ?message.channel, "Handler is already running, dropping message"),
        };
    }

    /// Consumes a confirmation slot of the head operation and updates the registry
    ///
    /// `error` is set for malformed confirmations, which still consume their slot.
    fn confirm(&self, transition: Transition, name: Option<Bytes>, error: Option<Error>) {
        let kind = transition.kind();
        let mut pending = self.pending.borrow_mut();
        let mut registry = self.registry.borrow_mut();
        let operation = pending.front_transition(transition);

        if let Some(name) = &name {
            if transition.is_removal() {
                registry.remove(kind, name);
            } else if let Some(handler) = operation.as_ref().and_then(|operation| operation.handler.clone()) {
                registry.insert(kind, name.clone(), handler);
            }
        }

        let operation = match operation {
            Some(operation) => operation,
            None => {
                warn!(command = transition.keyword(), ?name, "Confirmation without pending command");
                return;
            }
        };

        // Nil names confirm an unsubscription without any active subscription
        let drained = (error.is_none() && name.is_none()) || registry.count(kind) == 0;
        if !operation.consume(error, drained) {
            return;
        }

        if let Some(operation) = pending.pop_transition() {
            debug!(command = transition.keyword(), "Subscription command completed");
            operation.complete();
        }
    }

    /// Resolves the head operation with a regular (non push) reply
    fn reply(&self, frame: P::FrameType) {
        let result = self.connection.get_protocol().assert_error(&frame).map_err(Error::from);

        let request = self.pending.borrow_mut().pop_request();
        if let Some(operation) = request {
            debug!("Received reply");
            operation.resolve(result.map(|_| frame));
            return;
        }

        let head = self.pending.borrow().head_transition();
        match (head, result) {
            (Some(transition), Err(error)) => {
                warn!(command = transition.keyword(), ?error, "Subscription command rejected");
                let operation = self.pending.borrow_mut().pop_transition();
                if let Some(operation) = operation {
                    operation.fail(error);
                }
            }
            (Some(transition), Ok(())) => {
                warn!(command = transition.keyword(), "Unexpected reply while awaiting confirmation");
                self.confirm(transition, None, Some(Error::ProtocolError));
            }
            (None, _) => warn!("Reply without pending command"),
        }
    }
}
