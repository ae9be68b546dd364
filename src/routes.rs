//! Router assembly: maps verb+path onto repository/coordinator operations
//! and applies the identity gateway to everything business-facing.

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::handlers;
use crate::middleware::provider_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .merge(auth_routes())
        .merge(clientes_routes())
        .merge(sedes_routes())
        .merge(tecnicos_routes())
        .merge(servicios_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            provider_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/auth/logout", post(auth::logout))
}

fn clientes_routes() -> Router<AppState> {
    use handlers::clients;

    Router::new()
        .route("/api/clientes", get(clients::list).post(clients::create))
        .route(
            "/api/clientes/:id",
            get(clients::get_by_id)
                .put(clients::update)
                .delete(clients::delete),
        )
}

fn sedes_routes() -> Router<AppState> {
    use handlers::sites;

    Router::new()
        .route("/api/sedes", get(sites::list).post(sites::create))
        .route("/api/sedes/mias", get(sites::list_mine))
        .route("/api/sedes/cliente/:cliente_id", get(sites::list_by_client))
        .route(
            "/api/sedes/:id",
            get(sites::get_by_id).put(sites::update).delete(sites::delete),
        )
}

fn tecnicos_routes() -> Router<AppState> {
    use handlers::technicians;

    Router::new()
        .route(
            "/api/tecnicos",
            get(technicians::list).post(technicians::create),
        )
        .route(
            "/api/tecnicos/disponibles/lista",
            get(technicians::list_available),
        )
        .route(
            "/api/tecnicos/:id",
            get(technicians::get_by_id)
                .put(technicians::update)
                .delete(technicians::delete),
        )
}

fn servicios_routes() -> Router<AppState> {
    use handlers::services;

    Router::new()
        .route(
            "/api/servicios",
            get(services::list_active).post(services::create),
        )
        .route("/api/servicios/solicitar", post(services::submit))
        .route("/api/servicios/mis-servicios", get(services::list_mine))
        .route("/api/servicios/trabajos", get(services::list_jobs))
        .route(
            "/api/servicios/solicitudes/pendientes",
            get(services::list_pending),
        )
        .route(
            "/api/servicios/:id",
            get(services::get_by_id)
                .put(services::update)
                .delete(services::delete),
        )
        .route(
            "/api/servicios/:id/asignar-tecnico",
            patch(services::assign_technician),
        )
        .route("/api/servicios/:id/estado", patch(services::update_status))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "InstaLar API (Rust)",
            "version": version,
            "description": "Field-service management backend",
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/verify, /api/auth/logout",
                "clientes": "/api/clientes[/:id]",
                "sedes": "/api/sedes[/:id], /api/sedes/mias, /api/sedes/cliente/:cliente_id",
                "tecnicos": "/api/tecnicos[/:id], /api/tecnicos/disponibles/lista",
                "servicios": "/api/servicios[/:id], /api/servicios/solicitar, /api/servicios/trabajos, /api/servicios/solicitudes/pendientes",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let failure = match state.store.health().await {
        Err(e) => Some(e),
        Ok(()) => state.auth.health().await.err(),
    };

    match failure {
        None => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "provider": "ok"
                }
            })),
        ),
        Some(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "Proveedor de datos no disponible",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "provider_error": err.to_string()
                }
            })),
        ),
    }
}
