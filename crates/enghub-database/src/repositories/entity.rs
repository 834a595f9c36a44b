//! Generic repository over a store session.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use enghub_core::cancel::run_cancellable;
use enghub_core::query::{Projection, Query};
use enghub_core::result::AppResult;
use enghub_core::traits::{Entity, Repository, StagedChange, StoreSession};
use enghub_core::types::{Filter, Page, PageRequest, SortField};

/// [`Repository`] implementation shared by every entity type.
pub struct EntityRepository<T: Entity> {
    session: Arc<dyn StoreSession>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityRepository<T> {
    /// Create a repository bound to `session`.
    pub fn new(session: Arc<dyn StoreSession>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    /// Record snapshots of `entities` so unchanged updates are skipped.
    fn track<'a>(&self, entities: impl IntoIterator<Item = &'a T>) -> AppResult<()> {
        let tracker = self.session.tracker();
        for entity in entities {
            tracker.track(T::SCHEMA.name, entity.id(), serde_json::to_value(entity)?);
        }
        Ok(())
    }
}

impl<T: Entity> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.session))
    }
}

impl<T: Entity> fmt::Debug for EntityRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("table", &T::SCHEMA.name)
            .finish()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for EntityRepository<T> {
    async fn get_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<Option<T>> {
        let row = run_cancellable(cancel, "find", self.session.find(&T::SCHEMA, id)).await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let entity: T = serde_json::from_value(row)?;
        self.track([&entity])?;
        Ok(Some(entity))
    }

    async fn get_first_or_default(
        &self,
        filter: Filter,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Option<T>> {
        let entity = Query::<T>::filtered(Some(filter))
            .first(self.session.as_ref(), cancel)
            .await?;
        if track_changes {
            self.track(entity.iter())?;
        }
        Ok(entity)
    }

    async fn get_all(
        &self,
        filter: Option<Filter>,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<T>> {
        let entities = Query::<T>::filtered(filter)
            .to_vec(self.session.as_ref(), cancel)
            .await?;
        if track_changes {
            self.track(&entities)?;
        }
        Ok(entities)
    }

    async fn get_all_projected<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<R>> {
        Query::<T>::filtered(filter)
            .project::<R>()
            .to_vec(self.session.as_ref(), cancel)
            .await
    }

    async fn get_all_paged(
        &self,
        filter: Option<Filter>,
        page: PageRequest,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Page<T>> {
        self.get_all_paged_sorted(filter, None, page, track_changes, cancel)
            .await
    }

    async fn get_all_paged_sorted(
        &self,
        filter: Option<Filter>,
        sort: Option<SortField>,
        page: PageRequest,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Page<T>> {
        let page = Query::<T>::ordered(filter, sort)
            .paginate(self.session.as_ref(), page, cancel)
            .await?;
        if track_changes {
            self.track(&page.items)?;
        }
        Ok(page)
    }

    async fn get_all_paged_projected<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>> {
        self.get_all_paged_projected_sorted::<R>(filter, None, page, cancel)
            .await
    }

    async fn get_all_paged_projected_sorted<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        sort: Option<SortField>,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>> {
        Query::<T>::ordered(filter, sort)
            .project::<R>()
            .paginate(self.session.as_ref(), page, cancel)
            .await
    }

    fn insert(&self, entity: &T) -> AppResult<()> {
        let row = serde_json::to_value(entity)?;
        self.session
            .tracker()
            .stage(StagedChange::insert(T::SCHEMA, entity.id(), row))
    }

    fn insert_many(&self, entities: &[T]) -> AppResult<()> {
        entities.iter().try_for_each(|entity| self.insert(entity))
    }

    fn update(&self, entity: &T) -> AppResult<()> {
        let row = serde_json::to_value(entity)?;
        let tracker = self.session.tracker();
        if tracker.is_unchanged(T::SCHEMA.name, entity.id(), &row) {
            // Back to the loaded state: an update staged earlier is stale.
            debug!(table = T::SCHEMA.name, id = %entity.id(), "Skipping unchanged entity");
            tracker.unstage_update(T::SCHEMA.name, entity.id());
            return Ok(());
        }
        tracker.stage(StagedChange::update(T::SCHEMA, entity.id(), row))
    }

    fn update_many(&self, entities: &[T]) -> AppResult<()> {
        entities.iter().try_for_each(|entity| self.update(entity))
    }

    fn delete(&self, entity: &mut T) -> AppResult<()> {
        match entity.as_soft_deletable() {
            Some(flagged) => {
                flagged.mark_deleted();
                debug!(table = T::SCHEMA.name, id = %entity.id(), "Soft-deleting entity");
                let row = serde_json::to_value(&*entity)?;
                self.session
                    .tracker()
                    .stage(StagedChange::update(T::SCHEMA, entity.id(), row))
            }
            None => self
                .session
                .tracker()
                .stage(StagedChange::delete(T::SCHEMA, entity.id())),
        }
    }
}
