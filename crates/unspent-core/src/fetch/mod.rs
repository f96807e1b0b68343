//! Unspent-output source abstraction.
//!
//! Defines the [`UnspentSource`] trait and provides an HTTP implementation
//! ([`HttpFetcher`]) plus a test mock (`mock::MockSource`).

mod http_client;
#[cfg(test)]
pub mod mock;

pub use http_client::HttpFetcher;

use async_trait::async_trait;
use bitcoin::Address;

use crate::error::BalanceError;

/// Fetches the raw unspent-output listing for one address.
///
/// Implementations return the response body only for a successful query.
/// Any other outcome maps to [`BalanceError::HttpStatus`] or
/// [`BalanceError::NetworkIo`]. Connections must not outlive the call.
#[async_trait]
pub trait UnspentSource: Send + Sync {
    async fn fetch_unspent(&self, address: &Address) -> Result<String, BalanceError>;
}
