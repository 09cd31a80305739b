pub mod auth;
pub mod builder;
pub mod hello;
pub mod helpers;
pub mod publish;
pub mod pubsub;

/// Error in case Redis response type does not match the command
#[derive(Debug)]
pub struct ResponseTypeError {}

/// Generic request/response command. F is either [Resp2Frame](redis_protocol::resp2::types::Frame) or
/// [Resp3Frame](redis_protocol::resp3::types::Frame)
///
/// Subscription commands are not modeled as [Command], as they are answered by push messages instead
/// of a single response. See [PubSubClient](crate::subscription::PubSubClient).
pub trait Command<F> {
    /// Response type, either a custom evaluated "high-level" response or the original RESP frame
    type Response;

    /// Encodes the command to RESP2/RESP3 frame
    fn encode(&self) -> F;

    /// Evaluates the response frame and crafts the high level response from it.
    ///
    /// Error responses are captured upfront and converted to CommandErrors::ErrorResponse.
    /// So error responses never reach that method.
    ///
    /// Returns Error only in case of protocol violation (e.g. received an array for a command
    /// that only returns integers)
    fn eval_response(&self, frame: F) -> Result<Self::Response, ResponseTypeError>;
}
