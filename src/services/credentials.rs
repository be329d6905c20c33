//! Owner credential lookup
//!
//! Token refresh and credential lifecycle live elsewhere; the engine only
//! needs "current bearer credential for this owner" before every external
//! call.

use async_trait::async_trait;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current credential for `owner`, or an error when none is on file.
    /// A missing credential skips the owner's entities for this tick only.
    async fn credential_for(
        &self,
        owner: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}
