use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Middleware for authentication: validates the bearer token and attaches
/// the principal to request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    let user = validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Handler-side role gate. The admin cancellation path deliberately skips
/// the ownership check, so the role gate is the only thing standing between
/// a doctor token and the admin surface.
pub fn require_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "This action requires the {} role",
            role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(role: Role) -> AuthUser {
        AuthUser {
            id: "someone".to_string(),
            role,
            email: None,
            issued_at: Some(Utc::now()),
        }
    }

    #[test]
    fn role_gate_accepts_matching_role() {
        assert!(require_role(&principal(Role::Admin), Role::Admin).is_ok());
    }

    #[test]
    fn role_gate_rejects_other_roles() {
        assert!(require_role(&principal(Role::Doctor), Role::Admin).is_err());
        assert!(require_role(&principal(Role::Patient), Role::Doctor).is_err());
    }
}
