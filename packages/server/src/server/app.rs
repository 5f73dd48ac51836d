//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use telegram::Connector;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::user::JwtService;
use crate::kernel::{PgProfileStore, PgSessionStore, PgUserStore, ServerDeps};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    dialogs_handler, health_handler, list_profiles_handler, login_handler, me_handler,
    register_handler, send_handler, start_auth_handler, unread_handler, verify_code_handler,
    verify_password_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_deps: Arc<ServerDeps>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router
///
/// Wires the Postgres store adapters and the given provider connector into
/// ServerDeps, then mounts the routes behind the JWT middleware.
pub fn build_app(pool: PgPool, connector: Arc<dyn Connector>, config: &Config) -> Router {
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let server_deps = Arc::new(ServerDeps::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgProfileStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool.clone())),
        connector,
        jwt_service.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    ));

    let app_state = AppState {
        db_pool: pool,
        server_deps,
        jwt_service: jwt_service.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_for_middleware = jwt_service.clone();

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/me", get(me_handler))
        .route("/profiles", get(list_profiles_handler))
        .route("/profiles/start", post(start_auth_handler))
        .route("/profiles/code", post(verify_code_handler))
        .route("/profiles/password", post(verify_password_handler))
        .route("/messages/unread", post(unread_handler))
        .route("/messages/send", post(send_handler))
        .route("/messages/dialogs", post(dialogs_handler))
        .layer(middleware::from_fn(move |request, next| {
            jwt_auth_middleware(jwt_for_middleware.clone(), request, next)
        }))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
