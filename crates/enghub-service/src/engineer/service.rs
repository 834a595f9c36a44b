//! Engineer use cases over one store scope.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::traits::{Repository, StoreSession, UnitOfWork};
use enghub_core::types::{LookupDto, Page, PageRequest};
use enghub_database::{EngineerRepository, StoreUnitOfWork};

use crate::validation::ValidatorRegistry;

use super::dto::{CreateEngineerDto, EngineerDto, EngineerSearch};

const ENTITY_NAME: &str = "Engineer";

/// Engineer operations bound to a single store session.
///
/// Build one per request: the repository and the unit of work share the
/// session, so staged changes are committed together.
#[derive(Debug, Clone)]
pub struct EngineerService {
    engineers: EngineerRepository,
    uow: StoreUnitOfWork,
    validators: Arc<ValidatorRegistry>,
}

impl EngineerService {
    /// Creates a service over `session`.
    pub fn new(session: Arc<dyn StoreSession>, validators: Arc<ValidatorRegistry>) -> Self {
        Self {
            engineers: EngineerRepository::new(Arc::clone(&session)),
            uow: StoreUnitOfWork::new(session),
            validators,
        }
    }

    /// Every engineer, in store order.
    pub async fn get_all_engineers(&self, cancel: &CancellationToken) -> AppResult<Vec<EngineerDto>> {
        self.engineers
            .get_all_projected::<EngineerDto>(None, cancel)
            .await
    }

    /// One engineer, or `None` when the id is unknown.
    pub async fn get_engineer(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Option<EngineerDto>> {
        let engineer = self.engineers.get_by_id(id, cancel).await?;
        Ok(engineer.map(EngineerDto::from))
    }

    /// A page of engineers matching `search`.
    pub async fn get_engineers_paged(
        &self,
        search: &EngineerSearch,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> AppResult<Page<EngineerDto>> {
        self.engineers
            .get_all_paged_projected_sorted::<EngineerDto>(
                search.filter(),
                search.sort.clone(),
                page,
                cancel,
            )
            .await
    }

    /// `{ id, name }` pairs for pickers.
    pub async fn get_engineer_lookup(
        &self,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<LookupDto<Uuid>>> {
        self.engineers
            .get_all_projected::<LookupDto<Uuid>>(None, cancel)
            .await
    }

    /// Validates `dto`, stores a new engineer and returns its id.
    pub async fn insert_engineer(
        &self,
        dto: CreateEngineerDto,
        cancel: &CancellationToken,
    ) -> AppResult<Uuid> {
        self.validators.validate(&dto)?;

        let engineer = dto.into_entity();
        self.engineers.insert(&engineer)?;
        self.uow.commit(cancel).await?;

        info!(engineer_id = %engineer.id, "Engineer created");
        Ok(engineer.id.into_uuid())
    }

    /// Validates `dto` and overwrites the names of the engineer it identifies.
    pub async fn update_engineer(
        &self,
        dto: EngineerDto,
        cancel: &CancellationToken,
    ) -> AppResult<EngineerDto> {
        self.validators.validate(&dto)?;

        let mut engineer = self
            .engineers
            .get_by_id(dto.id, cancel)
            .await?
            .ok_or_else(|| AppError::entity_not_found(ENTITY_NAME, dto.id))?;

        engineer.name = dto.name;
        engineer.name_ar = dto.name_ar;
        self.engineers.update(&engineer)?;
        let changes = self.uow.commit(cancel).await?;

        info!(engineer_id = %engineer.id, changes, "Engineer updated");
        Ok(EngineerDto::from(engineer))
    }

    /// Removes the engineer with `id`.
    pub async fn delete_engineer(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<()> {
        let mut engineer = self
            .engineers
            .get_by_id(id, cancel)
            .await?
            .ok_or_else(|| AppError::entity_not_found(ENTITY_NAME, id))?;

        self.engineers.delete(&mut engineer)?;
        self.uow.commit(cancel).await?;

        info!(engineer_id = %id, "Engineer deleted");
        Ok(())
    }
}
