use bytes::Bytes;

use crate::codec::Reply;
use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::store::Store;

/// Get the value of `key`. A key that was never set reads as the empty string.
///
/// The value is sent back as a simple string rather than a bulk string, and bytes that aren't
/// valid UTF-8 are replaced.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: Bytes,
}

impl Executable for Get {
    fn exec(self, store: &Store) -> Reply {
        let value = store.read(&self.key);
        Reply::Simple(String::from_utf8_lossy(&value).into_owned())
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_args(1)?;
        let key = parser.next_bytes();
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::frame::Frame;

    #[test]
    fn existing_key() {
        let frame = Frame::array(vec![Frame::bulk("GET"), Frame::bulk("key1")]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Get(Get {
                key: Bytes::from("key1")
            })
        );

        let store = Store::new();
        store.write(Bytes::from("key1"), Bytes::from("1"));

        let result = cmd.exec(&store);

        assert_eq!(result, Reply::simple("1"));
    }

    #[test]
    fn missing_key() {
        let frame = Frame::array(vec![Frame::bulk("GET"), Frame::bulk("key1")]);
        let cmd = Command::try_from(frame).unwrap();

        let result = cmd.exec(&Store::new());

        assert_eq!(result, Reply::simple(""));
    }

    #[test]
    fn binary_value_is_lossy() {
        let store = Store::new();
        store.write(Bytes::from("key1"), Bytes::from(vec![b'o', b'k', 0xff]));

        let result = Get {
            key: Bytes::from("key1"),
        }
        .exec(&store);

        assert_eq!(result, Reply::simple("ok\u{FFFD}"));
    }

    #[test]
    fn non_utf8_keys_stay_distinct() {
        let store = Store::new();
        store.write(Bytes::from_static(b"\xff"), Bytes::from("first"));
        store.write(Bytes::from_static(b"\xfe"), Bytes::from("second"));

        let frame = Frame::array(vec![Frame::bulk("GET"), Frame::bulk(&b"\xff"[..])]);
        let result = Command::try_from(frame).unwrap().exec(&store);

        assert_eq!(result, Reply::simple("first"));
    }

    #[test]
    fn wrong_number_of_arguments() {
        let none = Frame::array(vec![Frame::bulk("GET")]);
        let two = Frame::array(vec![Frame::bulk("GET"), Frame::bulk("a"), Frame::bulk("b")]);

        let err = Command::try_from(none).unwrap_err();
        assert_eq!(Reply::from(err), Reply::error("Expected 1 arg, got 0"));

        let err = Command::try_from(two).unwrap_err();
        assert_eq!(Reply::from(err), Reply::error("Expected 1 arg, got 2"));
    }
}
