pub mod about;
pub mod achievement;
pub mod auth;
pub mod contact;
pub mod gallery;
pub mod team;
pub mod workshop;

pub use about::*;
pub use achievement::*;
pub use auth::*;
pub use contact::*;
pub use gallery::*;
pub use team::*;
pub use workshop::*;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// How a collection is addressed on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Many items, each with a server-assigned id
    Collection,
    /// Exactly one implicit instance, no id
    Singleton,
    /// Listed by the operator, never edited
    ReadOnly,
}

/// Who may invoke an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Disabled,
    /// No bearer token is attached
    Public,
    /// The session token is attached (or nothing, when logged out)
    Operator,
}

impl Access {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Access::Disabled)
    }
}

/// The operations a collection exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub list: Access,
    pub create: Access,
    pub update: Access,
    pub delete: Access,
}

/// A remote collection item type and its per-collection parameters
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Draft: Draft;

    /// Path segment under `/api`
    const COLLECTION: &'static str;
    /// Singular name used in notifications
    const LABEL: &'static str;
    const SHAPE: Shape;
    const OPERATIONS: Operations;

    /// Server-assigned identifier; `None` only for singletons
    fn id(&self) -> Option<&str>;

    /// Copy every editable field into a fresh draft
    fn to_draft(&self) -> Self::Draft;

    fn base_path() -> String {
        format!("/api/{}", Self::COLLECTION)
    }

    fn item_path(id: &str) -> String {
        format!("/api/{}/{}", Self::COLLECTION, id)
    }
}

/// Editable copy of an item's fields prior to submission
pub trait Draft: Default + Clone + fmt::Debug + PartialEq + Serialize + Send + Sync {
    /// Fields that must be non-blank before a request is issued
    const REQUIRED: &'static [&'static str];

    /// Current text value of a named field
    fn field(&self, name: &str) -> Option<String>;

    /// Set a field from text input
    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()>;

    /// Required fields that are blank
    fn missing_required(&self) -> Vec<&'static str> {
        Self::REQUIRED
            .iter()
            .copied()
            .filter(|name| {
                self.field(name)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Client-side required-field check
    fn validate(&self) -> AppResult<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "{} required",
                missing.join(", ")
            )))
        }
    }
}

// ============ Field helpers shared by the drafts ============

pub(crate) fn unknown_field(draft: &str, name: &str) -> AppError {
    AppError::Validation(format!("{} has no field '{}'", draft, name))
}

pub(crate) fn parse_bool(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "{} must be true or false",
            name
        ))),
    }
}

pub(crate) fn parse_int(name: &str, value: &str) -> AppResult<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{} must be a whole number", name)))
}

/// Blank optional text is omitted from request bodies
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
