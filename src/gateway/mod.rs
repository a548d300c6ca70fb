pub mod auth;

pub use auth::AuthGateway;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{ApiRequest, Backend};
use crate::error::{AppError, AppResult};
use crate::models::{Access, MessageResponse, Resource, Shape};

/// Typed client over one remote collection
///
/// Every method checks the collection's enabled operations before issuing a
/// request. Tokens are attached only to operator operations; a missing token
/// does not block the call, the backend is left to reject it.
pub struct Gateway<R> {
    backend: Arc<dyn Backend>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Gateway<R> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Gateway<R> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _resource: PhantomData,
        }
    }

    /// Fetch every item, in server order
    pub async fn list(&self, token: Option<&str>) -> AppResult<Vec<R>> {
        if R::SHAPE == Shape::Singleton {
            return Ok(vec![self.get().await?]);
        }
        let access = enabled::<R>(R::OPERATIONS.list, "list")?;
        let request = ApiRequest::get(R::base_path()).with_token(attach(access, token));
        decode(self.backend.send(request).await?)
    }

    /// Create an item; the server assigns its id
    pub async fn create<B: serde::Serialize>(&self, body: &B, token: Option<&str>) -> AppResult<R> {
        if R::SHAPE != Shape::Collection {
            return Err(unsupported::<R>("create"));
        }
        let access = enabled::<R>(R::OPERATIONS.create, "create")?;
        let request = ApiRequest::post(R::base_path(), serde_json::to_value(body)?)
            .with_token(attach(access, token));
        decode(self.backend.send(request).await?)
    }

    /// Replace the editable fields of an item
    pub async fn update<B: serde::Serialize>(
        &self,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> AppResult<()> {
        if R::SHAPE != Shape::Collection {
            return Err(unsupported::<R>("update"));
        }
        let access = enabled::<R>(R::OPERATIONS.update, "update")?;
        let request = ApiRequest::put(R::item_path(id), serde_json::to_value(body)?)
            .with_token(attach(access, token));
        self.backend.send(request).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str, token: Option<&str>) -> AppResult<()> {
        if R::SHAPE != Shape::Collection {
            return Err(unsupported::<R>("delete"));
        }
        let access = enabled::<R>(R::OPERATIONS.delete, "delete")?;
        let request = ApiRequest::delete(R::item_path(id)).with_token(attach(access, token));
        self.backend.send(request).await?;
        Ok(())
    }

    /// Read the one implicit instance of a singleton resource
    pub async fn get(&self) -> AppResult<R> {
        if R::SHAPE != Shape::Singleton {
            return Err(unsupported::<R>("get"));
        }
        enabled::<R>(R::OPERATIONS.list, "get")?;
        decode(self.backend.send(ApiRequest::get(R::base_path())).await?)
    }

    /// Replace the one implicit instance of a singleton resource
    pub async fn set<B: serde::Serialize>(&self, body: &B, token: Option<&str>) -> AppResult<()> {
        if R::SHAPE != Shape::Singleton {
            return Err(unsupported::<R>("set"));
        }
        let access = enabled::<R>(R::OPERATIONS.update, "set")?;
        let request = ApiRequest::put(R::base_path(), serde_json::to_value(body)?)
            .with_token(attach(access, token));
        self.backend.send(request).await?;
        Ok(())
    }

    /// Public submission to a read-only collection; returns the server's acknowledgement
    pub async fn submit<B: serde::Serialize>(&self, body: &B) -> AppResult<String> {
        if R::SHAPE != Shape::ReadOnly {
            return Err(unsupported::<R>("submit"));
        }
        if enabled::<R>(R::OPERATIONS.create, "submit")? != Access::Public {
            return Err(unsupported::<R>("submit"));
        }
        let request = ApiRequest::post(R::base_path(), serde_json::to_value(body)?);
        let ack: MessageResponse = decode(self.backend.send(request).await?)?;
        Ok(ack.message)
    }
}

fn enabled<R: Resource>(access: Access, operation: &str) -> AppResult<Access> {
    if access.is_enabled() {
        Ok(access)
    } else {
        Err(unsupported::<R>(operation))
    }
}

fn unsupported<R: Resource>(operation: &str) -> AppError {
    AppError::Unsupported(format!("{} on {}", operation, R::COLLECTION))
}

fn attach(access: Access, token: Option<&str>) -> Option<String> {
    match access {
        Access::Operator => token.map(str::to_string),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> AppResult<T> {
    Ok(serde_json::from_value(value)?)
}
