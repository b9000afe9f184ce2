use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::UpdateProfileRequest;
use crate::services::profile::ProfileService;

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = ProfileService::new(&state);
    let patient = service.get_profile(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "user": patient,
    })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = ProfileService::new(&state);
    service.update_profile(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile Updated",
    })))
}
