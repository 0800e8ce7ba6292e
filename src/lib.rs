//! Backend for the route and vehicle tracking app: table-generic persistence
//! behind credential-based authentication.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{AuthService, TokenKeys};
use crate::config::Config;
use crate::notify::Notifier;
use crate::store::ResourceStore;

/// Shared application state. Everything is built by `main` (or a test harness)
/// and handed in; request code never reads ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        let keys = TokenKeys::new(&config.auth.jwt_secret);
        let auth = Arc::new(AuthService::new(
            store,
            notifier,
            keys.clone(),
            config.mail.reset_link_base.clone(),
        ));
        Self { auth, keys }
    }
}

/// Assemble the application router: credential routes behind trace and CORS
/// layers scoped to the tracking frontend.
pub fn app(state: AppState, frontend_origin: &str) -> Router {
    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => {
            cors = cors.allow_origin(origin);
        }
        Err(_) => {
            tracing::warn!(
                origin = frontend_origin,
                "unparseable frontend origin, CORS stays closed"
            );
        }
    }

    auth::routes::router(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
