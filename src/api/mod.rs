pub mod auth;
pub mod error;
mod validation;

use axum::{
    middleware,
    routing::{get, get_service},
    Router,
};
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let pages = state.config.server.pages_dir.clone();

    // Public pages and auth endpoints
    let public_routes = Router::new()
        .route_service("/", ServeFile::new(pages.join("homepage.html")))
        .route(
            "/login",
            get_service(ServeFile::new(pages.join("login.html"))).post(auth::login),
        )
        .route(
            "/register",
            get_service(ServeFile::new(pages.join("register.html"))).post(auth::register),
        )
        .route("/logout", get(auth::logout))
        .route("/check-login-status", get(auth::login_status));

    // Content pages behind the access gate
    let protected_routes = Router::new()
        .route_service("/about", ServeFile::new(pages.join("about.html")))
        .route_service("/contact", ServeFile::new(pages.join("contact.html")))
        .route_service("/feature", ServeFile::new(pages.join("feature.html")))
        .route_service("/pricing", ServeFile::new(pages.join("pricing.html")))
        .route_service(
            "/pricing-checkout",
            ServeFile::new(pages.join("pricing-checkout.html")),
        )
        .route_service("/notify", ServeFile::new(pages.join("safety.html")))
        .route_service("/earthquake", ServeFile::new(pages.join("earthquake.html")))
        .route_service("/weather", ServeFile::new(pages.join("weather.html")))
        .layer(middleware::from_fn_with_state(state.clone(), auth::gate));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        // Page assets (css, images) resolve against the pages directory
        .fallback_service(ServeDir::new(&pages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
