//! Generic repository contract.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::query::Projection;
use crate::result::AppResult;
use crate::traits::entity::Entity;
use crate::types::filter::Filter;
use crate::types::pagination::{Page, PageRequest};
use crate::types::sorting::SortField;

/// Per-entity-type CRUD and query surface bound to one store session.
///
/// Reads cross into the store and accept a cancellation token. Mutations
/// only stage changes; nothing is durable until the session's
/// [`UnitOfWork`](crate::traits::UnitOfWork) commits.
///
/// With `track_changes = true`, returned entities are remembered by the
/// session so that a later [`Repository::update`] of an unmodified entity
/// stages nothing.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Find an entity by primary key. A missing row is `Ok(None)`.
    async fn get_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<Option<T>>;

    /// First entity matching `filter` in store order.
    async fn get_first_or_default(
        &self,
        filter: Filter,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Option<T>>;

    /// Every entity matching `filter`, unordered.
    async fn get_all(
        &self,
        filter: Option<Filter>,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<T>>;

    /// Every matching row, reshaped into `R`.
    async fn get_all_projected<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<R>>;

    /// One unordered page of matching entities.
    async fn get_all_paged(
        &self,
        filter: Option<Filter>,
        page: PageRequest,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Page<T>>;

    /// One page of matching entities ordered by `sort`.
    async fn get_all_paged_sorted(
        &self,
        filter: Option<Filter>,
        sort: Option<SortField>,
        page: PageRequest,
        track_changes: bool,
        cancel: &CancellationToken,
    ) -> AppResult<Page<T>>;

    /// One unordered page of matching rows, reshaped into `R`.
    async fn get_all_paged_projected<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>>;

    /// One page of matching rows ordered by `sort`, reshaped into `R`.
    async fn get_all_paged_projected_sorted<R: Projection<T>>(
        &self,
        filter: Option<Filter>,
        sort: Option<SortField>,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>>;

    /// Stage a new entity.
    fn insert(&self, entity: &T) -> AppResult<()>;

    /// Stage several new entities.
    fn insert_many(&self, entities: &[T]) -> AppResult<()>;

    /// Stage a full update of an existing entity.
    fn update(&self, entity: &T) -> AppResult<()>;

    /// Stage full updates of several existing entities.
    fn update_many(&self, entities: &[T]) -> AppResult<()>;

    /// Stage the removal of an entity.
    ///
    /// Soft-deletable types are flagged as deleted (the flag is set on
    /// `entity`) and an update is staged; every other type is physically
    /// removed on commit.
    fn delete(&self, entity: &mut T) -> AppResult<()>;
}
