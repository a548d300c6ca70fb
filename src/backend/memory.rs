//! In-process stand-in for the content API.
//!
//! Follows the REST contract the client expects: public reads, bearer-token
//! mutations, server-assigned ids and timestamps, newest-first listings (team
//! by `order`), `{detail}` error bodies. Used by tests and offline demos.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{ApiRequest, Backend, Method};
use crate::error::{AppError, AppResult};
use crate::models::DEFAULT_ABOUT;

const DEFAULT_SECRET: &str = "memory-backend-secret-change-me";
const TOKEN_LIFETIME_DAYS: i64 = 7;

/// JWT claims issued by the in-memory backend
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    id: String,
    exp: i64,
}

/// Field layout of one stored collection
struct CollectionSpec {
    name: &'static str,
    label: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
    updatable: bool,
}

const COLLECTIONS: &[CollectionSpec] = &[
    CollectionSpec {
        name: "gallery",
        label: "Photo",
        required: &["image_url"],
        optional: &["caption"],
        updatable: false,
    },
    CollectionSpec {
        name: "achievements",
        label: "Achievement",
        required: &["title", "description", "date"],
        optional: &["image_url"],
        updatable: true,
    },
    CollectionSpec {
        name: "team",
        label: "Team member",
        required: &["name", "role", "image_url"],
        optional: &["instagram", "linkedin", "twitter"],
        updatable: true,
    },
    CollectionSpec {
        name: "workshop",
        label: "Workshop",
        required: &["title", "description", "date"],
        optional: &["registration_link", "image_url"],
        updatable: true,
    },
];

fn collection_spec(name: &str) -> Option<&'static CollectionSpec> {
    COLLECTIONS.iter().find(|spec| spec.name == name)
}

struct Admin {
    id: String,
    password_hash: String,
}

#[derive(Default)]
struct MemoryBackendInner {
    admins: HashMap<String, Admin>,
    /// Newest first
    collections: HashMap<&'static str, Vec<Value>>,
    contact: Vec<Value>,
    about: Option<Value>,
    requests: Vec<ApiRequest>,
    failures_pending: usize,
}

/// In-memory content API for testing
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryBackendInner>>,
    secret: Arc<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_secret(DEFAULT_SECRET)
    }

    pub fn with_secret(secret: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryBackendInner::default())),
            secret: Arc::new(secret.to_string()),
        }
    }

    /// Every request received so far, in arrival order
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().await.requests.clone()
    }

    pub async fn clear_requests(&self) {
        self.inner.lock().await.requests.clear();
    }

    /// Make the next `count` requests fail as if the network were down
    pub async fn fail_next(&self, count: usize) {
        self.inner.lock().await.failures_pending = count;
    }

    /// Mint a token for an email without registering it
    pub fn issue_token(&self, email: &str) -> AppResult<String> {
        self.token_for(email, &Uuid::new_v4().to_string())
    }

    fn verify_token(&self, token: Option<&str>) -> AppResult<Claims> {
        let token = token.ok_or_else(|| reject(403, "Not authenticated"))?;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| {
            tracing::trace!(operator = %data.claims.email, admin_id = %data.claims.id, "Token accepted");
            data.claims
        })
        .map_err(|_| reject(401, "Invalid token"))
    }

    // ============ Auth ============

    async fn register(&self, body: &Value) -> AppResult<Value> {
        let (email, password) = credentials(body)?;

        if self.inner.lock().await.admins.contains_key(&email) {
            return Err(reject(400, "Admin already exists"));
        }

        let password_hash = hash_password(&password)?;
        let id = Uuid::new_v4().to_string();

        let mut inner = self.inner.lock().await;
        if inner.admins.contains_key(&email) {
            return Err(reject(400, "Admin already exists"));
        }
        inner.admins.insert(
            email.clone(),
            Admin {
                id: id.clone(),
                password_hash,
            },
        );
        drop(inner);

        let token = self.token_for(&email, &id)?;
        Ok(json!({ "token": token, "email": email }))
    }

    async fn login(&self, body: &Value) -> AppResult<Value> {
        let (email, password) = credentials(body)?;

        let (id, password_hash) = {
            let inner = self.inner.lock().await;
            let admin = inner
                .admins
                .get(&email)
                .ok_or_else(|| reject(401, "Invalid credentials"))?;
            (admin.id.clone(), admin.password_hash.clone())
        };

        if !verify_password(&password, &password_hash)? {
            return Err(reject(401, "Invalid credentials"));
        }

        let token = self.token_for(&email, &id)?;
        Ok(json!({ "token": token, "email": email }))
    }

    fn token_for(&self, email: &str, id: &str) -> AppResult<String> {
        let claims = Claims {
            email: email.to_string(),
            id: id.to_string(),
            exp: (OffsetDateTime::now_utc() + Duration::days(TOKEN_LIFETIME_DAYS)).unix_timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Storage(format!("Token generation failed: {}", e)))
    }

    // ============ Routing ============

    async fn route(&self, request: &ApiRequest) -> AppResult<Value> {
        let path = request
            .path
            .strip_prefix("/api/")
            .ok_or_else(|| reject(404, "Not Found"))?;
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let null = Value::Null;
        let body = request.body.as_ref().unwrap_or(&null);
        let token = request.token.as_deref();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["admin", "register"]) => self.register(body).await,
            (Method::Post, ["admin", "login"]) => self.login(body).await,

            (Method::Get, ["about"]) => Ok(self.get_about().await),
            (Method::Put, ["about"]) => {
                self.verify_token(token)?;
                self.set_about(body).await
            }

            (Method::Post, ["contact"]) => self.submit_contact(body).await,
            (Method::Get, ["contact"]) => {
                self.verify_token(token)?;
                Ok(Value::Array(self.inner.lock().await.contact.clone()))
            }

            (method, [name]) if collection_spec(name).is_some() => {
                let spec = collection_spec(name).ok_or_else(|| reject(404, "Not Found"))?;
                match method {
                    Method::Get => Ok(self.list(spec).await),
                    Method::Post => {
                        self.verify_token(token)?;
                        self.create(spec, body).await
                    }
                    _ => Err(reject(405, "Method Not Allowed")),
                }
            }
            (method, [name, id]) if collection_spec(name).is_some() => {
                let spec = collection_spec(name).ok_or_else(|| reject(404, "Not Found"))?;
                match method {
                    Method::Put if spec.updatable => {
                        self.verify_token(token)?;
                        self.update(spec, id, body).await
                    }
                    Method::Delete => {
                        self.verify_token(token)?;
                        self.delete(spec, id).await
                    }
                    _ => Err(reject(405, "Method Not Allowed")),
                }
            }

            _ => Err(reject(404, "Not Found")),
        }
    }

    // ============ Collections ============

    async fn list(&self, spec: &CollectionSpec) -> Value {
        let inner = self.inner.lock().await;
        let mut items = inner.collections.get(spec.name).cloned().unwrap_or_default();
        if spec.name == "team" {
            // Stable, so equal orders stay newest first
            items.sort_by_key(|item| item.get("order").and_then(Value::as_i64).unwrap_or(0));
        }
        Value::Array(items)
    }

    async fn create(&self, spec: &CollectionSpec, body: &Value) -> AppResult<Value> {
        let mut item = normalize(spec, body)?;
        item.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        item.insert("created_at".to_string(), json!(now_rfc3339()?));
        let item = Value::Object(item);

        self.inner
            .lock()
            .await
            .collections
            .entry(spec.name)
            .or_default()
            .insert(0, item.clone());

        Ok(item)
    }

    async fn update(&self, spec: &CollectionSpec, id: &str, body: &Value) -> AppResult<Value> {
        let fields = normalize(spec, body)?;

        let mut inner = self.inner.lock().await;
        let existing = inner
            .collections
            .get_mut(spec.name)
            .and_then(|items| items.iter_mut().find(|item| item["id"] == id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| reject(404, &format!("{} not found", spec.label)))?;

        for (key, value) in fields {
            existing.insert(key, value);
        }

        Ok(json!({ "message": format!("{} updated", spec.label) }))
    }

    async fn delete(&self, spec: &CollectionSpec, id: &str) -> AppResult<Value> {
        let mut inner = self.inner.lock().await;
        let items = inner.collections.entry(spec.name).or_default();
        let before = items.len();
        items.retain(|item| item["id"] != id);

        if items.len() == before {
            return Err(reject(404, &format!("{} not found", spec.label)));
        }

        Ok(json!({ "message": format!("{} deleted", spec.label) }))
    }

    // ============ About & contact ============

    async fn get_about(&self) -> Value {
        self.inner
            .lock()
            .await
            .about
            .clone()
            .unwrap_or_else(|| json!({ "content": DEFAULT_ABOUT }))
    }

    async fn set_about(&self, body: &Value) -> AppResult<Value> {
        let content = required_text(body, "content")?;
        let about = json!({
            "id": Uuid::new_v4().to_string(),
            "content": content,
            "updated_at": now_rfc3339()?,
        });

        // Replaced wholesale; no history is kept
        self.inner.lock().await.about = Some(about);
        Ok(json!({ "message": "About content updated" }))
    }

    async fn submit_contact(&self, body: &Value) -> AppResult<Value> {
        let name = required_text(body, "name")?;
        let email = required_text(body, "email")?;
        let message = required_text(body, "message")?;
        check_email(&email)?;

        let submission = json!({
            "id": Uuid::new_v4().to_string(),
            "name": name,
            "email": email,
            "message": message,
            "created_at": now_rfc3339()?,
        });
        self.inner.lock().await.contact.insert(0, submission);

        Ok(json!({ "message": "Message sent successfully" }))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        {
            let mut inner = self.inner.lock().await;
            inner.requests.push(request.clone());
            if inner.failures_pending > 0 {
                inner.failures_pending -= 1;
                return Err(AppError::Network("connection refused".to_string()));
            }
        }

        let result = self.route(&request).await;
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            ok = result.is_ok(),
            "Memory backend handled request"
        );
        result
    }
}

// ============ Helpers ============

fn reject(status: u16, detail: &str) -> AppError {
    AppError::rejected(status, Some(detail.to_string()))
}

fn missing(field: &str) -> AppError {
    AppError::rejected(422, Some(format!("{}: Field required", field)))
}

fn required_text(body: &Value, field: &str) -> AppResult<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(field))
}

fn check_email(email: &str) -> AppResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::rejected(
            422,
            Some("email: value is not a valid email address".to_string()),
        )),
    }
}

fn credentials(body: &Value) -> AppResult<(String, String)> {
    let email = required_text(body, "email")?;
    let password = required_text(body, "password")?;
    check_email(&email)?;
    Ok((email, password))
}

/// Keep only known fields, filling defaults like the backend's models do
fn normalize(spec: &CollectionSpec, body: &Value) -> AppResult<Map<String, Value>> {
    let mut item = Map::new();

    for field in spec.required {
        item.insert(field.to_string(), json!(required_text(body, field)?));
    }
    for field in spec.optional {
        let value = body.get(*field).cloned().unwrap_or(Value::Null);
        if !(value.is_null() || value.is_string()) {
            return Err(AppError::rejected(
                422,
                Some(format!("{}: Input should be a valid string", field)),
            ));
        }
        item.insert(field.to_string(), value);
    }

    match spec.name {
        "team" => {
            let order = match body.get("order") {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    AppError::rejected(422, Some("order: Input should be a valid integer".to_string()))
                })?,
            };
            item.insert("order".to_string(), json!(order));
        }
        "workshop" => {
            let is_active = match body.get("is_active") {
                None | Some(Value::Null) => true,
                Some(value) => value.as_bool().ok_or_else(|| {
                    AppError::rejected(
                        422,
                        Some("is_active: Input should be a valid boolean".to_string()),
                    )
                })?,
            };
            item.insert("is_active".to_string(), json!(is_active));
        }
        _ => {}
    }

    Ok(item)
}

fn now_rfc3339() -> AppResult<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::Storage(e.to_string()))
}

/// Cheap Argon2 parameters; this backend only ever holds throwaway accounts
fn hasher() -> AppResult<Argon2<'static>> {
    let params = Params::new(4096, 1, 1, None)
        .map_err(|e| AppError::Storage(format!("Invalid hash parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Storage(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Storage(format!("Invalid password hash: {}", e)))?;
    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
