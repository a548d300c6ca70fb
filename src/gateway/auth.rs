use std::sync::Arc;

use crate::backend::{ApiRequest, Backend};
use crate::error::AppResult;
use crate::models::{AdminCredentials, AuthResponse};

const LOGIN_PATH: &str = "/api/admin/login";
const REGISTER_PATH: &str = "/api/admin/register";

/// Exchanges operator credentials for a bearer token
#[derive(Clone)]
pub struct AuthGateway {
    backend: Arc<dyn Backend>,
}

impl AuthGateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        self.exchange(LOGIN_PATH, email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        self.exchange(REGISTER_PATH, email, password).await
    }

    async fn exchange(&self, path: &str, email: &str, password: &str) -> AppResult<AuthResponse> {
        let body = AdminCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post(path, serde_json::to_value(&body)?);
        let response = self.backend.send(request).await?;
        Ok(serde_json::from_value(response)?)
    }
}
