use std::sync::Arc;

use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Role;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store_url(url: &str) -> Self {
        Self {
            store_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "admin-password-for-tests".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn mint_token(&self, sub: &str, role: Role) -> String {
        issue_token(sub, role, None, &self.jwt_secret).expect("test token")
    }
}

pub struct TestPrincipal {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl TestPrincipal {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role,
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }
}
