//! Route definitions for the booking API.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod client;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod hours;
pub mod professionals;
pub mod services;
pub mod settings;

use axum::{
    http::HeaderValue,
    response::Redirect,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/register", post(auth::admin_register))
        .route("/admin/login", post(auth::admin_login))
        .route("/business/login", post(auth::business_login))
        .route("/business/register", post(auth::business_register))
        .route("/client/{business_id}/register", post(auth::client_register))
        .route("/client/{business_id}/login", post(auth::client_login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/businesses",
            get(admin::list_businesses).post(admin::create_business),
        )
        .route(
            "/businesses/{id}",
            get(admin::get_business)
                .put(admin::update_business)
                .delete(admin::delete_business),
        )
        .route(
            "/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
}

fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/{id}",
            get(clients::get_by_id)
                .put(clients::update)
                .delete(clients::delete),
        )
        .route("/clients/{id}/history", get(clients::history))
        .route(
            "/professionals",
            get(professionals::list).post(professionals::create),
        )
        .route(
            "/professionals/{id}",
            get(professionals::get_by_id)
                .put(professionals::update)
                .delete(professionals::delete),
        )
        .route("/professionals/{id}/schedule", get(professionals::schedule))
        .route("/services", get(services::list).post(services::create))
        .route(
            "/services/{id}",
            get(services::get_by_id)
                .put(services::update)
                .delete(services::delete),
        )
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_by_id).delete(appointments::delete),
        )
        .route("/appointments/{id}/status", patch(appointments::update_status))
        .route("/appointments/{id}/reschedule", post(appointments::reschedule))
        .route("/hours", get(hours::get_hours).put(hours::save_hours))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/{business_id}/catalog", get(client::catalog))
        .route("/{business_id}/availability", get(client::availability))
        .route("/{business_id}/booking", post(client::book))
        .route("/{business_id}/history", get(client::history))
        .route(
            "/{business_id}/settings",
            get(client::get_settings).put(client::update_settings),
        )
}

fn cors(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, frontend_url, "Invalid FRONTEND_URL, CORS origin not set");
            layer
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/business", business_routes())
        .nest("/client", client_routes());

    Router::new()
        .route("/", get(health::live))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api)
        .fallback(|| async { Redirect::to("/") })
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors(&state.config.frontend_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
