pub mod echo;
pub mod executable;
pub mod get;
pub mod ping;
pub mod set;

use bytes::Bytes;
use std::vec;
use strum_macros::{Display, EnumString};
use thiserror::Error as ThisError;

use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;

use echo::Echo;
use get::Get;
use ping::Ping;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Echo(Echo),
    Get(Get),
    Ping(Ping),
    Set(Set),
}

impl Executable for Command {
    fn exec(self, store: &Store) -> Reply {
        match self {
            Command::Echo(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the server as RESP arrays.
        let frames = match frame {
            Frame::Array(frames) if !frames.is_empty() => frames,
            _ => return Err(CommandError::InvalidRequest),
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        match parser.parse_command_name()? {
            CommandName::Echo => Echo::try_from(parser).map(Command::Echo),
            CommandName::Get => Get::try_from(parser).map(Command::Get),
            CommandName::Ping => Ping::try_from(parser).map(Command::Ping),
            CommandName::Set => Set::try_from(parser).map(Command::Set),
        }
    }
}

#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
enum CommandName {
    Echo,
    Get,
    Ping,
    Set,
}

pub struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    /// Command names are case-insensitive; unknown ones are reported in lower case.
    fn parse_command_name(&mut self) -> Result<CommandName, CommandError> {
        let name = self
            .parts
            .next()
            .map(|frame| frame.as_string().to_lowercase())
            .unwrap_or_default();

        match name.parse() {
            Ok(command_name) => Ok(command_name),
            Err(_) => Err(CommandError::UnknownCommand { name }),
        }
    }

    fn expect_args(&self, expected: usize) -> Result<(), CommandError> {
        let actual = self.parts.len();
        if actual != expected {
            return Err(CommandError::WrongArity { expected, actual });
        }
        Ok(())
    }

    fn next_bytes(&mut self) -> Bytes {
        self.parts
            .next()
            .map(|frame| frame.as_bytes())
            .unwrap_or_default()
    }

    fn remaining_strings(&mut self) -> Vec<String> {
        self.parts.by_ref().map(|frame| frame.as_string()).collect()
    }
}

/// Errors that are answered with a RESP error reply. The connection stays open after any of them.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("Expected {} {}, got {}", .expected, arg_noun(.expected), .actual)]
    WrongArity { expected: usize, actual: usize },
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },
    #[error("ERR invalid request, expected a non-empty array")]
    InvalidRequest,
}

fn arg_noun(count: &usize) -> &'static str {
    if *count == 1 {
        "arg"
    } else {
        "args"
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err.to_string())
    }
}
