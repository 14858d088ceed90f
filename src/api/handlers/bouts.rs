use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::db::{bout_repo, offer_repo};
use crate::errors::AppError;
use crate::models::{Bout, Offer};
use crate::AppState;

use super::offers::ApiResponse;

/// GET /api/bouts/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Bout>>, AppError> {
    let bout = bout_repo::get_bout(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("bout not found".into()))?;

    Ok(ApiResponse::ok(bout))
}

/// GET /api/bouts/{id}/offers
pub async fn offers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Offer>>>, AppError> {
    let offers = offer_repo::list_offers_for_bout(&state.db, id).await?;

    Ok(ApiResponse::ok(offers))
}
