//! Abstraction of AUTH command.
//!
//! Executed automatically by [ConnectionHandler](crate::network::ConnectionHandler) when
//! [Credentials](crate::network::Credentials) are configured.
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/auth/>).
use crate::commands::builder::CommandBuilder;
use crate::commands::{Command, ResponseTypeError};
use crate::network::frame::ReplyValue;
use crate::network::handler::Credentials;
use bytes::Bytes;

/// Abstraction for AUTH command
pub struct AuthCommand {
    /// Optional username for ACL based authentication (Redis >= 6)
    username: Option<Bytes>,
    password: Bytes,
}

impl AuthCommand {
    pub fn new<U, P>(username: Option<U>, password: P) -> Self
    where
        U: Into<Bytes>,
        P: Into<Bytes>,
    {
        AuthCommand {
            username: username.map(Into::into),
            password: password.into(),
        }
    }
}

impl<F> Command<F> for AuthCommand
where
    F: ReplyValue + From<CommandBuilder>,
{
    type Response = ();

    fn encode(&self) -> F {
        CommandBuilder::new("AUTH")
            .arg_option(self.username.as_ref())
            .arg(&self.password)
            .into()
    }

    fn eval_response(&self, frame: F) -> Result<Self::Response, ResponseTypeError> {
        match frame.to_text() {
            Some(text) if text == "OK" => Ok(()),
            _ => Err(ResponseTypeError {}),
        }
    }
}

impl From<&Credentials> for AuthCommand {
    fn from(credentials: &Credentials) -> AuthCommand {
        AuthCommand::new(credentials.username.clone(), credentials.password.clone())
    }
}
