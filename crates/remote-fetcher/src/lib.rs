//! Single-shot HTTP resource fetching
//!
//! Fetches a remote representation, validates the response status, and
//! decodes the body into a typed value off the transport task. No retries,
//! no caching; failures are reported through [`FetchError`].

mod error;
mod fetcher;

pub use error::{FetchError, ResponseError, Result};
pub use fetcher::{BoxError, Fetchable, RemoteFetcher};
