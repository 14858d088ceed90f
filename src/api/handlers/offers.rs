use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{offer_repo, payment_repo};
use crate::errors::AppError;
use crate::models::{Decision, Offer, Payment, Side};
use crate::workflow::CreateOfferOutcome;
use crate::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

#[derive(Deserialize)]
pub struct CreateOfferRequest {
    pub bout_id: Uuid,
    pub side: String,
    pub sender_id: Uuid,
    pub fighter_id: Uuid,
}

#[derive(Deserialize)]
pub struct ResolveOfferRequest {
    pub actor_id: Uuid,
}

#[derive(Serialize)]
pub struct CreateOfferResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<Offer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Serialize)]
pub struct OfferDetail {
    pub offer: Offer,
    pub payment: Option<Payment>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/offers — propose a fighter for a corner slot
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOfferRequest>,
) -> Result<Json<ApiResponse<CreateOfferResponse>>, AppError> {
    let side = Side::from_api_str(&body.side)
        .ok_or_else(|| AppError::BadRequest(format!("invalid side '{}'", body.side)))?;

    let outcome = state
        .ledger
        .create_offer(body.bout_id, side, body.sender_id, body.fighter_id)
        .await?;

    let resp = match outcome {
        CreateOfferOutcome::Created { offer, payment } => CreateOfferResponse {
            offer: Some(offer),
            payment,
            checkout_url: None,
            reference: None,
        },
        CreateOfferOutcome::CheckoutPending {
            reference,
            checkout_url,
        } => CreateOfferResponse {
            offer: None,
            payment: None,
            checkout_url: Some(checkout_url),
            reference: Some(reference),
        },
    };

    Ok(ApiResponse::ok(resp))
}

/// GET /api/offers/{id} — offer with its payment bookkeeping
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OfferDetail>>, AppError> {
    let offer = offer_repo::get_offer(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("offer not found".into()))?;
    let payment = payment_repo::get_by_offer(&state.db, offer.id).await?;

    Ok(ApiResponse::ok(OfferDetail { offer, payment }))
}

/// POST /api/offers/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveOfferRequest>,
) -> Result<Json<ApiResponse<Offer>>, AppError> {
    let offer = state
        .ledger
        .resolve_offer(id, Decision::Accept, body.actor_id)
        .await?;

    Ok(ApiResponse::ok(offer))
}

/// POST /api/offers/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveOfferRequest>,
) -> Result<Json<ApiResponse<Offer>>, AppError> {
    let offer = state
        .ledger
        .resolve_offer(id, Decision::Decline, body.actor_id)
        .await?;

    Ok(ApiResponse::ok(offer))
}
