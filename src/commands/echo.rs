use itertools::Itertools;

use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;

/// Returns the arguments joined by single spaces, as a simple string.
///
/// Ref: <https://redis.io/docs/latest/commands/echo/>
#[derive(Debug, PartialEq)]
pub struct Echo {
    pub words: Vec<String>,
}

impl Executable for Echo {
    fn exec(self, _store: &Store) -> Reply {
        Reply::Simple(self.words.iter().join(" "))
    }
}

impl TryFrom<&mut CommandParser> for Echo {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let words = parser.remaining_strings();
        Ok(Self { words })
    }
}
