use bytes::Bytes;

use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;

/// Set `key` to hold `value`, replacing any previous value.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: Bytes,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, store: &Store) -> Reply {
        store.write(self.key, self.value);
        Reply::simple("OK")
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_args(2)?;
        let key = parser.next_bytes();
        let value = parser.next_bytes();

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::frame::Frame;

    #[test]
    fn parse_from_simple_and_bulk_strings() {
        let frames = [
            vec![Frame::simple("SET"), Frame::simple("foo"), Frame::simple("baz")],
            vec![Frame::simple("SET"), Frame::bulk("foo"), Frame::bulk("baz")],
            vec![Frame::bulk("set"), Frame::bulk("foo"), Frame::simple("baz")],
            vec![Frame::bulk("Set"), Frame::simple("foo"), Frame::bulk("baz")],
        ];

        for frame in frames {
            let cmd = Command::try_from(Frame::array(frame)).unwrap();

            assert_eq!(
                cmd,
                Command::Set(Set {
                    key: Bytes::from("foo"),
                    value: Bytes::from("baz")
                })
            );
        }
    }

    #[test]
    fn integer_value_keeps_its_digits() {
        let frame = Frame::array(vec![Frame::bulk("SET"), Frame::bulk("n"), Frame::integer(42)]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Set(Set {
                key: Bytes::from("n"),
                value: Bytes::from("42")
            })
        );
    }

    #[test]
    fn set_then_get() {
        let store = Store::new();

        let set = Frame::array(vec![Frame::bulk("SET"), Frame::bulk("k"), Frame::bulk("v")]);
        let reply = Command::try_from(set).unwrap().exec(&store);
        assert_eq!(reply, Reply::simple("OK"));

        let other = Frame::array(vec![Frame::bulk("SET"), Frame::bulk("k2"), Frame::bulk("x")]);
        Command::try_from(other).unwrap().exec(&store);

        let get = Frame::array(vec![Frame::bulk("GET"), Frame::bulk("k")]);
        let reply = Command::try_from(get).unwrap().exec(&store);
        assert_eq!(reply, Reply::simple("v"));
    }

    #[test]
    fn non_utf8_keys_do_not_collide() {
        let store = Store::new();

        for (key, value) in [(&b"\xff"[..], "first"), (&b"\xfe"[..], "second")] {
            let set = Frame::array(vec![Frame::bulk("SET"), Frame::bulk(key), Frame::bulk(value)]);
            Command::try_from(set).unwrap().exec(&store);
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.read(b"\xff"), Bytes::from("first"));
        assert_eq!(store.read(b"\xfe"), Bytes::from("second"));
    }

    #[test]
    fn wrong_number_of_arguments() {
        let one = Frame::array(vec![Frame::bulk("SET"), Frame::bulk("k")]);
        let three = Frame::array(vec![
            Frame::bulk("SET"),
            Frame::bulk("k"),
            Frame::bulk("v"),
            Frame::bulk("EX"),
        ]);

        let err = Command::try_from(one).unwrap_err();
        assert_eq!(Reply::from(err), Reply::error("Expected 2 args, got 1"));

        let err = Command::try_from(three).unwrap_err();
        assert_eq!(Reply::from(err), Reply::error("Expected 2 args, got 3"));
    }
}
