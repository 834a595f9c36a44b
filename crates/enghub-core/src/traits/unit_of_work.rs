//! Unit-of-work contract.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::result::AppResult;

/// Commits every change staged through the repositories of one session.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Apply all staged changes as one atomic batch and return how many
    /// were applied. Committing nothing succeeds with `0`.
    ///
    /// On failure nothing is persisted and the staged changes are dropped;
    /// the caller should retry the whole scope.
    async fn commit(&self, cancel: &CancellationToken) -> AppResult<usize>;
}
