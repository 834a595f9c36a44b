//! Query/pagination engine.
//!
//! A [`Query`] describes a read against one entity table: an optional
//! filter narrows the candidates and an optional sort key orders them.
//! [`Query::project`] reshapes the rows into a [`Projection`], and the
//! materialisers (`count`, `to_vec`, `first`, `paginate`) run the query
//! against a [`StoreSession`].
//!
//! The composition order is fixed: filter, then sort, then projection,
//! then the page window. Sorting happens before projection, so a sort key
//! may name a column the projection drops.

mod projection;

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cancel::run_cancellable;
use crate::result::AppResult;
use crate::traits::entity::Entity;
use crate::traits::store::{QuerySpec, StoreSession, Window};
use crate::types::filter::Filter;
use crate::types::pagination::{Page, PageRequest};
use crate::types::sorting::SortField;

pub use projection::Projection;

/// A filtered and optionally ordered read over the table of `T`.
pub struct Query<T: Entity> {
    filter: Option<Filter>,
    sort: Option<SortField>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Query<T> {
    /// Every row, in store order.
    pub fn all() -> Self {
        Self::ordered(None, None)
    }

    /// Rows matching `filter`; `None` matches every row.
    pub fn filtered(filter: Option<Filter>) -> Self {
        Self::ordered(filter, None)
    }

    /// Rows matching `filter`, ordered by `sort` when given.
    pub fn ordered(filter: Option<Filter>, sort: Option<SortField>) -> Self {
        Self {
            filter,
            sort,
            _entity: PhantomData,
        }
    }

    /// Reshape the rows of this query into `R`.
    pub fn project<R: Projection<T>>(self) -> ProjectedQuery<T, R> {
        ProjectedQuery {
            query: self,
            _projection: PhantomData,
        }
    }

    /// The filter, if any.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// The sort key, if any.
    pub fn sort(&self) -> Option<&SortField> {
        self.sort.as_ref()
    }

    /// Check every referenced field name against the table schema.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(filter) = &self.filter {
            for name in filter.field_names() {
                T::SCHEMA.require_column(name)?;
            }
        }
        if let Some(sort) = &self.sort {
            T::SCHEMA.require_column(&sort.field)?;
        }
        Ok(())
    }

    fn spec(&self) -> QuerySpec<'_> {
        QuerySpec {
            schema: T::SCHEMA,
            filter: self.filter.as_ref().filter(|f| !f.is_empty()),
            sort: self.sort.as_ref(),
        }
    }

    /// Number of matching rows.
    pub async fn count(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<u64> {
        self.validate()?;
        run_cancellable(cancel, "count", session.count(self.spec())).await
    }

    /// Every matching row.
    pub async fn to_vec(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<T>> {
        self.materialise(session, None, None, cancel).await
    }

    /// The first matching row, if any.
    pub async fn first(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<Option<T>> {
        let window = Window {
            offset: 0,
            limit: 1,
        };
        let rows = self.materialise(session, None, Some(window), cancel).await?;
        Ok(rows.into_iter().next())
    }

    /// One page of matching rows plus pagination metadata.
    pub async fn paginate(
        &self,
        session: &dyn StoreSession,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<T>> {
        self.paginate_as(session, None, page, cancel).await
    }

    async fn materialise<R: DeserializeOwned>(
        &self,
        session: &dyn StoreSession,
        projection: Option<&[&'static str]>,
        window: Option<Window>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<R>> {
        self.validate()?;
        let rows = run_cancellable(
            cancel,
            "fetch",
            session.fetch(self.spec(), projection, window),
        )
        .await?;
        decode_rows(rows)
    }

    async fn paginate_as<R: DeserializeOwned>(
        &self,
        session: &dyn StoreSession,
        projection: Option<&[&'static str]>,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>> {
        if page.was_clamped() {
            debug!(
                table = T::SCHEMA.name,
                page_index = page.page_index,
                page_size = page.page_size,
                "Page request corrected to valid minimums"
            );
        }
        self.validate()?;

        let spec = self.spec();
        let window = Window {
            offset: page.offset(),
            limit: page.limit(),
        };
        let (total, rows) = run_cancellable(cancel, "paginate", async {
            let total = session.count(spec).await?;
            let rows = session.fetch(spec, projection, Some(window)).await?;
            Ok((total, rows))
        })
        .await?;

        debug!(
            table = T::SCHEMA.name,
            total,
            returned = rows.len(),
            page_index = page.page_index,
            "Fetched page"
        );
        Ok(Page::new(decode_rows(rows)?, &page, total))
    }
}

impl<T: Entity> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self::ordered(self.filter.clone(), self.sort.clone())
    }
}

impl<T: Entity> Default for Query<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T: Entity> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &T::SCHEMA.name)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .finish()
    }
}

/// A [`Query`] whose rows are reshaped into `R`.
pub struct ProjectedQuery<T: Entity, R: Projection<T>> {
    query: Query<T>,
    _projection: PhantomData<fn() -> R>,
}

impl<T: Entity, R: Projection<T>> ProjectedQuery<T, R> {
    /// The underlying entity query.
    pub fn query(&self) -> &Query<T> {
        &self.query
    }

    /// Check the query and the projected columns against the table schema.
    pub fn validate(&self) -> AppResult<()> {
        self.query.validate()?;
        for column in R::COLUMNS {
            T::SCHEMA.require_column(column)?;
        }
        Ok(())
    }

    /// Number of matching rows.
    pub async fn count(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<u64> {
        self.validate()?;
        self.query.count(session, cancel).await
    }

    /// Every matching row, projected.
    pub async fn to_vec(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<R>> {
        self.validate()?;
        self.query
            .materialise(session, Some(R::COLUMNS), None, cancel)
            .await
    }

    /// The first matching row, projected.
    pub async fn first(
        &self,
        session: &dyn StoreSession,
        cancel: &CancellationToken,
    ) -> AppResult<Option<R>> {
        self.validate()?;
        let window = Window {
            offset: 0,
            limit: 1,
        };
        let rows: Vec<R> = self
            .query
            .materialise(session, Some(R::COLUMNS), Some(window), cancel)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// One page of projected rows plus pagination metadata.
    pub async fn paginate(
        &self,
        session: &dyn StoreSession,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<R>> {
        self.validate()?;
        self.query
            .paginate_as(session, Some(R::COLUMNS), page, cancel)
            .await
    }
}

impl<T: Entity, R: Projection<T>> fmt::Debug for ProjectedQuery<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedQuery")
            .field("query", &self.query)
            .field("columns", &R::COLUMNS)
            .finish()
    }
}

fn decode_rows<R: DeserializeOwned>(rows: Vec<Value>) -> AppResult<Vec<R>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}
