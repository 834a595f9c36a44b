//! Unit of work over a store session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use enghub_core::cancel::run_cancellable;
use enghub_core::result::AppResult;
use enghub_core::traits::{StoreSession, UnitOfWork};

/// Commits the changes staged on one session.
#[derive(Debug, Clone)]
pub struct StoreUnitOfWork {
    session: Arc<dyn StoreSession>,
}

impl StoreUnitOfWork {
    /// Create a unit of work over `session`.
    pub fn new(session: Arc<dyn StoreSession>) -> Self {
        Self { session }
    }

    /// Number of changes waiting for the next commit.
    pub fn pending(&self) -> usize {
        self.session.tracker().pending()
    }
}

#[async_trait]
impl UnitOfWork for StoreUnitOfWork {
    async fn commit(&self, cancel: &CancellationToken) -> AppResult<usize> {
        let tracker = self.session.tracker();
        let changes = tracker.drain();
        if changes.is_empty() {
            debug!("Nothing to commit");
            return Ok(0);
        }

        let count = changes.len();
        match run_cancellable(cancel, "commit", self.session.apply(&changes)).await {
            Ok(()) => {
                tracker.accept(&changes);
                info!(changes = count, "Unit of work committed");
                Ok(count)
            }
            Err(e) => {
                warn!(changes = count, error = %e, "Commit failed; staged changes discarded");
                Err(e)
            }
        }
    }
}
