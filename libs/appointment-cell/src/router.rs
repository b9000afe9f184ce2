use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Patient surface
        .route("/book", post(handlers::book_appointment))
        .route("/cancel", post(handlers::cancel_appointment))
        .route("/user", get(handlers::list_user_appointments))
        // Doctor surface
        .route("/doctor", get(handlers::list_doctor_appointments))
        .route("/complete", post(handlers::complete_appointment))
        .route("/doctor/dashboard", get(handlers::doctor_dashboard))
        // Admin surface
        .route("/admin/all", get(handlers::list_all_appointments))
        .route("/admin/cancel", post(handlers::admin_cancel_appointment))
        .route("/admin/dashboard", get(handlers::admin_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
