use serde::{Deserialize, Serialize};

/// Body of `POST /api/admin/login` and `/api/admin/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

/// Successful auth exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
}

/// Acknowledgement returned by endpoints that do not echo an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
