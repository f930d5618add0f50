mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{middleware as axum_middleware, response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use middleware::auth::identity_middleware;
use middleware::cors::{cors_middleware, cors_middleware_with_origins};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Back-office de transporte de pasajeros y encomiendas");
    info!("=======================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool().await {
        Ok(pool) => {
            info!("✅ Base de datos conectada");
            pool
        }
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app_state = AppState::new(pool, config.clone());

    // Rutas protegidas: la identidad llega del gateway en headers
    let protected = Router::new()
        .nest("/api/trips", routes::trip_routes::create_trip_router())
        .nest(
            "/api/reservations",
            routes::reservation_routes::create_reservation_router(),
        )
        .nest("/api/routes", routes::route_routes::create_route_router())
        .nest(
            "/api/vehicles",
            routes::vehicle_routes::create_vehicle_router(),
        )
        .layer(axum_middleware::from_fn(identity_middleware));

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/search", routes::trip_routes::create_search_router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   POST /api/search/trips - Búsqueda de viajes (expandida u optimizada)");
    info!("🚌 Endpoints - Trips:");
    info!("   GET  /api/trips - Listar viajes de la empresa");
    info!("   POST /api/trips - Publicar viaje");
    info!("   GET  /api/trips/:id - Obtener viaje");
    info!("   PUT  /api/trips/:id/visibility - Cambiar visibilidad");
    info!("   DELETE /api/trips/:id - Eliminar viaje");
    info!("   GET  /api/trips/:id/passengers - Lista de abordaje");
    info!("🎫 Endpoints - Reservations:");
    info!("   POST /api/reservations - Crear reserva");
    info!("   POST /api/reservations/:id/confirm - Confirmar reserva");
    info!("   POST /api/reservations/:id/cancel - Cancelar reserva");
    info!("   POST /api/reservations/:id/check - Check-in de abordaje");
    info!("🗺️  Endpoints - Routes:");
    info!("   GET  /api/routes - Listar rutas");
    info!("   POST /api/routes - Crear ruta");
    info!("   GET  /api/routes/:id - Obtener ruta");
    info!("   GET  /api/routes/:id/segment-pairs - Combinaciones tarificables");
    info!("   DELETE /api/routes/:id - Eliminar ruta");
    info!("🚐 Endpoints - Vehicles:");
    info!("   GET  /api/vehicles - Listar vehículos");
    info!("   POST /api/vehicles - Registrar vehículo");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check del servicio
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "transport-booking",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
