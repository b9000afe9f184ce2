use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/user/register", post(handlers::register_user))
        .route("/user/login", post(handlers::login_user))
        .route("/doctor/login", post(handlers::login_doctor))
        .route("/admin/login", post(handlers::login_admin))
        .with_state(state)
}
