use crate::codec::Reply;
use crate::store::Store;

pub trait Executable {
    fn exec(self, store: &Store) -> Reply;
}
