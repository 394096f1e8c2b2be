//! Remote configuration fetching.
//!
//! The [`Fetcher`] trait is the seam between the cache manager and the
//! network. [`HttpFetcher`] is the production implementation; tests plug in
//! doubles that count calls or fail on demand.

pub mod http;

pub use http::{FetchOptions, HttpFetcher};

use std::io::Write;

use crate::error::Result;

/// Retrieves a remote payload and streams it into a sink.
pub trait Fetcher {
    /// Fetch `url`, writing the response body into `sink`.
    ///
    /// Returns the number of bytes written. On error the sink may hold a
    /// partial body; callers must discard it.
    fn fetch_into(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch_into(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        (**self).fetch_into(url, sink)
    }
}
