use crate::network::frame::ReplyValue;
use crate::subscription::registry::Kind;
use bytes::Bytes;

/// A published message handed to subscription handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The channel the message has been published to
    pub channel: Bytes,

    /// The subscribed pattern matching the channel. None for channel subscriptions.
    pub pattern: Option<Bytes>,

    /// The actual payload
    pub payload: Bytes,
}

/// Subscription state change confirmed by Redis
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Transition {
    Subscribe,
    Unsubscribe,
    PSubscribe,
    PUnsubscribe,
}

impl Transition {
    /// Command keyword, which is echoed as type of the confirmation message
    pub fn keyword(&self) -> &'static str {
        match self {
            Transition::Subscribe => "SUBSCRIBE",
            Transition::Unsubscribe => "UNSUBSCRIBE",
            Transition::PSubscribe => "PSUBSCRIBE",
            Transition::PUnsubscribe => "PUNSUBSCRIBE",
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Transition::Subscribe | Transition::Unsubscribe => Kind::Channel,
            Transition::PSubscribe | Transition::PUnsubscribe => Kind::Pattern,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Transition::Unsubscribe | Transition::PUnsubscribe)
    }
}

/// A decoded push message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// Confirmation of a (p)subscribe or (p)unsubscribe command, one per identifier.
    /// Name is None for unsubscribe confirmations sent when nothing was subscribed.
    /// Count is the total number of subscriptions of the connection.
    Confirmation {
        transition: Transition,
        name: Option<Bytes>,
        count: usize,
    },
    /// Published message of a channel or pattern subscription
    Message(Message),
}

/// Errors related for decoding push messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The given frame is not a push message, e.g. a regular command reply
    NoPushMessage,
    /// Unknown push message type (neither confirmation, message nor pmessage)
    UnknownType,
    /// Message or pmessage violating the expected format
    ProtocolViolation,
    /// Confirmation violating the expected format. Still consumes the confirmation slot of the command.
    /// Carries the channel or pattern name if it could be decoded.
    MalformedConfirmation(Transition, Option<Bytes>),
}

/// Decodes frames to push messages
pub trait ToPushMessage: ReplyValue {
    /// Tries to decode the frame to a push message
    fn decode_push(&self) -> Result<PushMessage, DecodeError> {
        Decoder::new(self).decode()
    }
}

impl<F: ReplyValue> ToPushMessage for F {}

/// Generic push message decoder for RESP2 + RESP3 frames
struct Decoder<'f, F: ReplyValue> {
    frame: &'f F,
}

impl<'f, F: ReplyValue> Decoder<'f, F> {
    fn new(frame: &'f F) -> Self {
        Self { frame }
    }

    fn decode(&self) -> Result<PushMessage, DecodeError> {
        // RESP3 marks push messages explicitly, arrays are always command replies
        if F::supports_push() && !self.frame.is_push() {
            return Err(DecodeError::NoPushMessage);
        }

        let data = self.frame.elements().ok_or(DecodeError::NoPushMessage)?;
        let tag = data.first().and_then(F::to_bytes_value);

        let transition = match tag.as_deref() {
            Some(b"message") => return self.decode_message(data),
            Some(b"pmessage") => return self.decode_pmessage(data),
            Some(b"subscribe") => Transition::Subscribe,
            Some(b"unsubscribe") => Transition::Unsubscribe,
            Some(b"psubscribe") => Transition::PSubscribe,
            Some(b"punsubscribe") => Transition::PUnsubscribe,
            _ if self.frame.is_push() => return Err(DecodeError::UnknownType),
            _ => return Err(DecodeError::NoPushMessage),
        };

        self.decode_confirmation(transition, data)
    }

    /// Decodes and validates a confirmation: [type, name-or-nil, count]
    fn decode_confirmation(&self, transition: Transition, data: &[F]) -> Result<PushMessage, DecodeError> {
        let name = data.get(1).and_then(F::to_bytes_value);
        if data.len() != 3 {
            return Err(DecodeError::MalformedConfirmation(transition, name));
        }

        // Unsubscribing without any active subscription is confirmed once with a nil name
        if name.is_none() && !(transition.is_removal() && data[1].is_nil()) {
            return Err(DecodeError::MalformedConfirmation(transition, None));
        }

        let count = match data[2].to_integer().and_then(|count| usize::try_from(count).ok()) {
            Some(count) => count,
            None => return Err(DecodeError::MalformedConfirmation(transition, name)),
        };

        Ok(PushMessage::Confirmation {
            transition,
            name,
            count,
        })
    }

    /// Decodes and validates a "message": [message, channel, payload]
    fn decode_message(&self, data: &[F]) -> Result<PushMessage, DecodeError> {
        if data.len() != 3 {
            return Err(DecodeError::ProtocolViolation);
        }

        Ok(PushMessage::Message(Message {
            channel: self.byte_string(&data[1])?,
            pattern: None,
            payload: self.byte_string(&data[2])?,
        }))
    }

    /// Decodes and validates a "pmessage": [pmessage, pattern, channel, payload]
    fn decode_pmessage(&self, data: &[F]) -> Result<PushMessage, DecodeError> {
        if data.len() != 4 {
            return Err(DecodeError::ProtocolViolation);
        }

        Ok(PushMessage::Message(Message {
            pattern: Some(self.byte_string(&data[1])?),
            channel: self.byte_string(&data[2])?,
            payload: self.byte_string(&data[3])?,
        }))
    }

    fn byte_string(&self, frame: &F) -> Result<Bytes, DecodeError> {
        frame.to_bytes_value().ok_or(DecodeError::ProtocolViolation)
    }
}
