use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;

/// Returns PONG. Any arguments are ignored.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping;

impl Executable for Ping {
    fn exec(self, _store: &Store) -> Reply {
        Reply::simple("PONG")
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
