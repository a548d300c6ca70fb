use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{unknown_field, Access, Draft, Operations, Resource, Shape};

/// Message left by a public visitor; private to the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Public contact form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactDraft {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }
}

impl Resource for ContactSubmission {
    type Draft = ContactDraft;

    const COLLECTION: &'static str = "contact";
    const LABEL: &'static str = "Message";
    const SHAPE: Shape = Shape::ReadOnly;
    const OPERATIONS: Operations = Operations {
        list: Access::Operator,
        create: Access::Public,
        update: Access::Disabled,
        delete: Access::Disabled,
    };

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_draft(&self) -> ContactDraft {
        ContactDraft::new(&self.name, &self.email, &self.message)
    }
}

impl Draft for ContactDraft {
    const REQUIRED: &'static [&'static str] = &["name", "email", "message"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "message" => Some(self.message.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "message" => self.message = value.to_string(),
            _ => return Err(unknown_field("contact form", name)),
        }
        Ok(())
    }
}
