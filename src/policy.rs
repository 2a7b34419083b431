pub(crate) mod linked_arena;
pub(crate) mod lru;

pub(crate) use lru::LruPolicy;
