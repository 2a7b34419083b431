//! A concurrent LRU cache that counts references to its values.
//!
//! Evicting a key from a regular LRU cache tears its value down right away. Here an evicted
//! value only leaves the recency bookkeeping, its eviction callback runs once every borrower has
//! released it. This makes the cache a good fit for values that are expensive to close and must
//! not be closed while in use, like open files or mapped buffers.
//!
//! # Quick Start
//! ```rust
//! use ref_lru::LruCache;
//!
//! let cache = LruCache::new(1);
//! cache.set_on_evicted(|key: &String, _value: &String| println!("closing {key}"));
//!
//! let (file, added) = cache.add("a".to_string(), "handle a".to_string());
//! assert!(added);
//!
//! // "a" is pushed out of the cache but stays alive while `file` is borrowed
//! cache.add("b".to_string(), "handle b".to_string()).0.done();
//! assert!(cache.get("a").is_none());
//! assert_eq!(file.as_str(), "handle a");
//!
//! // the callback for "a" runs here
//! file.done();
//! ```

/// The cache facade and the handles it hands out.
pub mod cache;
#[doc(inline)]
pub use cache::{CacheBuilder, Handle, LruCache};

mod entry;
pub use entry::OnEvicted;

pub mod error;
pub use error::BuildError;

mod policy;
