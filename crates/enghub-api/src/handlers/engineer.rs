//! Engineer handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use enghub_core::error::AppError;
use enghub_core::types::{Envelope, LookupDto, Page};
use enghub_service::{CreateEngineerDto, EngineerDto};

use crate::extractors::{JsonBody, PaginationParams, parse_uuid};
use crate::state::AppState;

const ENTITY_NAME: &str = "Engineer";

/// GET /api/engineers
pub async fn list_engineers(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<EngineerDto>>>, AppError> {
    let cancel = state.request_token();
    let engineers = state.engineer_service().get_all_engineers(&cancel).await?;
    Ok(Json(Envelope::success_with(engineers)))
}

/// GET /api/engineers/paged
pub async fn list_engineers_paged(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Envelope<Page<EngineerDto>>>, AppError> {
    let search = params.engineer_search()?;
    let cancel = state.request_token();
    let page = state
        .engineer_service()
        .get_engineers_paged(&search, params.page_request(), &cancel)
        .await?;
    Ok(Json(Envelope::success_with(page)))
}

/// GET /api/engineers/lookup
pub async fn engineer_lookup(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<LookupDto<Uuid>>>>, AppError> {
    let cancel = state.request_token();
    let lookup = state.engineer_service().get_engineer_lookup(&cancel).await?;
    Ok(Json(Envelope::success_with(lookup)))
}

/// GET /api/engineers/{id}
pub async fn get_engineer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_uuid(&id)?;
    let cancel = state.request_token();
    let response = match state.engineer_service().get_engineer(id, &cancel).await? {
        Some(engineer) => Json(Envelope::success_with(engineer)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(Envelope::<()>::not_found(ENTITY_NAME, id)),
        )
            .into_response(),
    };
    Ok(response)
}

/// POST /api/engineers
pub async fn create_engineer(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CreateEngineerDto>,
) -> Result<Json<Envelope<Uuid>>, AppError> {
    let cancel = state.request_token();
    let id = state.engineer_service().insert_engineer(dto, &cancel).await?;
    Ok(Json(Envelope::success_with(id)))
}

/// PUT /api/engineers/{id}
///
/// A body without an id takes the one from the path; a different id is
/// rejected.
pub async fn update_engineer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(mut dto): JsonBody<EngineerDto>,
) -> Result<Json<Envelope<EngineerDto>>, AppError> {
    let id = parse_uuid(&id)?;
    if dto.id.is_nil() {
        dto.id = id;
    } else if dto.id != id {
        return Err(AppError::invalid_argument(format!(
            "Body id {} does not match path id {id}",
            dto.id
        )));
    }

    let cancel = state.request_token();
    let engineer = state.engineer_service().update_engineer(dto, &cancel).await?;
    Ok(Json(Envelope::success_with(engineer)))
}

/// DELETE /api/engineers/{id}
pub async fn delete_engineer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, AppError> {
    let id = parse_uuid(&id)?;
    let cancel = state.request_token();
    state.engineer_service().delete_engineer(id, &cancel).await?;
    Ok(Json(Envelope::success_message("Engineer deleted")))
}
