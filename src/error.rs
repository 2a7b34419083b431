use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Errors raised while configuring a [`LruCache`](crate::LruCache).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// A bounded cache needs room for at least one entry, use
    /// [`CacheBuilder::unbounded`](crate::cache::builder::CacheBuilder::unbounded) to lift the
    /// limit instead.
    ZeroCapacity,
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ZeroCapacity => write!(f, "cache capacity must be greater than 0"),
        }
    }
}

impl Error for BuildError {}
