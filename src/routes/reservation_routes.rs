use axum::{
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::reservation_controller::ReservationController;
use crate::dto::common::ApiResponse;
use crate::dto::reservation_dto::{
    CancelReservationRequest, CheckInRequest, CreateReservationRequest, ReservationResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_reservation_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reservation))
        .route("/:id/confirm", post(confirm_reservation))
        .route("/:id/cancel", post(cancel_reservation))
        .route("/:id/check", post(check_in_reservation))
}

async fn create_reservation(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> AppResult<Json<ApiResponse<ReservationResponse>>> {
    let controller = ReservationController::new(state.pool.clone());
    let reservation = controller.create(user.company_id, request).await?;
    Ok(Json(ApiResponse::success(reservation)))
}

async fn confirm_reservation(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReservationResponse>>> {
    let controller = ReservationController::new(state.pool.clone());
    let reservation = controller.confirm(id, user.company_id).await?;
    Ok(Json(ApiResponse::success(reservation)))
}

async fn cancel_reservation(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<CancelReservationRequest>>,
) -> AppResult<Json<ApiResponse<ReservationResponse>>> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    let controller = ReservationController::new(state.pool.clone());
    let reservation = controller.cancel(id, user.company_id, request).await?;
    Ok(Json(ApiResponse::success(reservation)))
}

/// Check-in de abordaje; disponible para verificadores y choferes
async fn check_in_reservation(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CheckInRequest>,
) -> AppResult<Json<ApiResponse<ReservationResponse>>> {
    let controller = ReservationController::new(state.pool.clone());
    let reservation = controller.check_in(id, user.company_id, request).await?;
    Ok(Json(ApiResponse::success(reservation)))
}
