use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};

use crate::controllers::reservation_controller::ReservationController;
use crate::controllers::trip_controller::TripController;
use crate::dto::common::ApiResponse;
use crate::dto::trip_dto::{CreateTripRequest, TripSearchFilters, UpdateVisibilityRequest};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::trip::Trip;
use crate::services::boarding::GroupedReservation;
use crate::services::trip_search::TripView;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips))
        .route("/", post(create_trip))
        .route("/:id", get(get_trip))
        .route("/:id", delete(delete_trip))
        .route("/:id/visibility", put(update_visibility))
        .route("/:id/passengers", get(boarding_list))
}

/// Router público de búsqueda; no requiere identidad
pub fn create_search_router() -> Router<AppState> {
    Router::new().route("/trips", post(search_trips))
}

/// Búsqueda de viajes: modo expandido (una fila por segmento) u
/// optimizado (una fila representativa por viaje) según los filtros
async fn search_trips(
    State(state): State<AppState>,
    Json(filters): Json<TripSearchFilters>,
) -> AppResult<Json<Vec<TripView>>> {
    let controller = TripController::new(state.pool.clone());
    let views = controller.search(filters).await?;
    Ok(Json(views))
}

async fn list_trips(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TripView>>> {
    let controller = TripController::new(state.pool.clone());
    let views = controller.list_for_company(user.company_id).await?;
    Ok(Json(views))
}

async fn get_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Trip>> {
    let controller = TripController::new(state.pool.clone());
    let trip = controller.get(id, user.company_id).await?;
    Ok(Json(trip))
}

async fn create_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> AppResult<Json<ApiResponse<Trip>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = TripController::new(state.pool.clone());
    let trip = controller.create(user.company_id, request).await?;
    Ok(Json(ApiResponse::success(trip)))
}

async fn update_visibility(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateVisibilityRequest>,
) -> AppResult<Json<ApiResponse<Trip>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = TripController::new(state.pool.clone());
    let trip = controller
        .update_visibility(id, user.company_id, request)
        .await?;
    Ok(Json(ApiResponse::success(trip)))
}

async fn delete_trip(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = TripController::new(state.pool.clone());
    controller.delete(id, user.company_id).await?;
    Ok(Json(ApiResponse::success_with_message(
        (),
        "Viaje eliminado".to_string(),
    )))
}

/// Lista de abordaje para las vistas de verificación de pasajeros
async fn boarding_list(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<GroupedReservation>>> {
    let controller = ReservationController::new(state.pool.clone());
    let groups = controller.boarding_list(id, user.company_id).await?;
    Ok(Json(groups))
}
