use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, VehicleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route("/", post(create_vehicle))
}

async fn list_vehicles(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let controller = VehicleController::new(state.pool.clone());
    let vehicles = controller.list(user.company_id).await?;
    Ok(Json(vehicles))
}

async fn create_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<Json<ApiResponse<VehicleResponse>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = VehicleController::new(state.pool.clone());
    let vehicle = controller.create(user.company_id, request).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
