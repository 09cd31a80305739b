//! Abstraction of HELLO command.
//!
//! Switches the connection to RESP3 and is executed automatically by
//! [ConnectionHandler](crate::network::ConnectionHandler) for RESP3 connections.
//! For general information about this command, see the [Redis documentation](<https://redis.io/commands/hello/>).
use crate::commands::builder::CommandBuilder;
use crate::commands::helpers::RespMap;
use crate::commands::{Command, ResponseTypeError};
use alloc::string::String;
use alloc::vec::Vec;
use redis_protocol::resp2::types::Frame as Resp2Frame;
use redis_protocol::resp3::types::{Frame as Resp3Frame, RespVersion};

/// Abstraction of HELLO command.
pub struct HelloCommand {}

impl Command<Resp3Frame> for HelloCommand {
    type Response = HelloResponse;

    fn encode(&self) -> Resp3Frame {
        Resp3Frame::Hello {
            version: RespVersion::RESP3,
            auth: None,
        }
    }

    fn eval_response(&self, frame: Resp3Frame) -> Result<Self::Response, ResponseTypeError> {
        HelloResponse::try_from(frame)
    }
}

/// RESP2 connections stay on protocol version 2. The server answers with a flat key/value array.
impl Command<Resp2Frame> for HelloCommand {
    type Response = HelloResponse;

    fn encode(&self) -> Resp2Frame {
        CommandBuilder::new("HELLO").arg_static("2").into()
    }

    fn eval_response(&self, frame: Resp2Frame) -> Result<Self::Response, ResponseTypeError> {
        let elements = match frame {
            Resp2Frame::Array(elements) => elements,
            _ => return Err(ResponseTypeError {}),
        };

        Ok(HelloResponse {
            server: find_string(&elements, "server")?,
            version: find_string(&elements, "version")?,
            protocol: find_integer(&elements, "proto")?,
            id: find_integer(&elements, "id")?,
            mode: find_string(&elements, "mode")?,
            role: find_string(&elements, "role")?,
            modules: Vec::new(),
        })
    }
}

/// Finds the value of the given key in a flat RESP2 key/value array
fn find_value<'f>(elements: &'f [Resp2Frame], key: &str) -> Option<&'f Resp2Frame> {
    elements
        .chunks_exact(2)
        .find(|pair| pair[0].to_string().as_deref() == Some(key))
        .map(|pair| &pair[1])
}

fn find_string(elements: &[Resp2Frame], key: &str) -> Result<String, ResponseTypeError> {
    find_value(elements, key)
        .and_then(|value| value.to_string())
        .ok_or(ResponseTypeError {})
}

fn find_integer(elements: &[Resp2Frame], key: &str) -> Result<i64, ResponseTypeError> {
    match find_value(elements, key) {
        Some(Resp2Frame::Integer(number)) => Ok(*number),
        _ => Err(ResponseTypeError {}),
    }
}

/// Mapped response to HELLO command
#[derive(Debug)]
pub struct HelloResponse {
    pub server: String,
    pub version: String,
    pub protocol: i64,
    pub id: i64,
    pub mode: String,
    pub role: String,
    pub modules: Vec<Resp3Frame>,
}

impl TryFrom<Resp3Frame> for HelloResponse {
    type Error = ResponseTypeError;

    fn try_from(frame: Resp3Frame) -> Result<Self, Self::Error> {
        let map = match frame {
            Resp3Frame::Map { data, attributes: _ } => data,
            _ => return Err(ResponseTypeError {}),
        };

        let fields = RespMap::new(&map);

        Ok(HelloResponse {
            server: fields.find_string("server").ok_or(ResponseTypeError {})?,
            version: fields.find_string("version").ok_or(ResponseTypeError {})?,
            protocol: fields.find_integer("proto").ok_or(ResponseTypeError {})?,
            id: fields.find_integer("id").ok_or(ResponseTypeError {})?,
            mode: fields.find_string("mode").ok_or(ResponseTypeError {})?,
            role: fields.find_string("role").ok_or(ResponseTypeError {})?,
            modules: match fields.find("modules") {
                Some(Resp3Frame::Array { data, attributes: _ }) => data.clone(),
                _ => return Err(ResponseTypeError {}),
            },
        })
    }
}
