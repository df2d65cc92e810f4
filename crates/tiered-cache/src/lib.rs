//! Two-tier (memory + disk) object cache
//!
//! A bounded in-memory tier mirrors recently accessed entries in front of a
//! one-file-per-key disk tier. Reads run concurrently; every mutation runs as
//! an instance-wide exclusive barrier, so operations observe a total order
//! consistent with the order they were issued in.

mod cache;
mod codec;
mod memory;

pub use cache::DiskCache;
pub use codec::{BoxError, Cacheable};
pub use memory::{MemoryCache, MemoryStore};
