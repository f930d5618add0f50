use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::common::ApiResponse;
use crate::dto::route_dto::{CreateRouteRequest, RouteResponse, SegmentPairsResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_routes))
        .route("/", post(create_route))
        .route("/:id", get(get_route))
        .route("/:id", delete(delete_route))
        .route("/:id/segment-pairs", get(segment_pairs))
}

async fn list_routes(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RouteResponse>>> {
    let controller = RouteController::new(state.pool.clone());
    let routes = controller.list(user.company_id).await?;
    Ok(Json(routes))
}

async fn get_route(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RouteResponse>> {
    let controller = RouteController::new(state.pool.clone());
    let route = controller.get(id, user.company_id).await?;
    Ok(Json(route))
}

async fn create_route(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateRouteRequest>,
) -> AppResult<Json<ApiResponse<RouteResponse>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = RouteController::new(state.pool.clone());
    let route = controller.create(user.company_id, request).await?;
    Ok(Json(ApiResponse::success(route)))
}

/// Combinaciones origen→destino tarificables de la ruta
async fn segment_pairs(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SegmentPairsResponse>> {
    let controller = RouteController::new(state.pool.clone());
    let pairs = controller.segment_pairs(id, user.company_id).await?;
    Ok(Json(pairs))
}

async fn delete_route(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !user.can_manage() {
        return Err(AppError::Unauthorized(
            "Se requiere rol de operador".to_string(),
        ));
    }

    let controller = RouteController::new(state.pool.clone());
    controller.delete(id, user.company_id).await?;
    Ok(Json(ApiResponse::success_with_message(
        (),
        "Ruta eliminada".to_string(),
    )))
}
