use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{
    is_blank, parse_bool, unknown_field, Access, Draft, Operations, Resource, Shape,
};

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub registration_link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub registration_link: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub image_url: String,
    pub is_active: bool,
}

impl Default for WorkshopDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: String::new(),
            registration_link: String::new(),
            image_url: String::new(),
            is_active: true,
        }
    }
}

impl Resource for Workshop {
    type Draft = WorkshopDraft;

    const COLLECTION: &'static str = "workshop";
    const LABEL: &'static str = "Workshop";
    const SHAPE: Shape = Shape::Collection;
    const OPERATIONS: Operations = Operations {
        list: Access::Public,
        create: Access::Operator,
        update: Access::Operator,
        delete: Access::Operator,
    };

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_draft(&self) -> WorkshopDraft {
        WorkshopDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date.clone(),
            registration_link: self.registration_link.clone().unwrap_or_default(),
            image_url: self.image_url.clone().unwrap_or_default(),
            is_active: self.is_active,
        }
    }
}

impl Draft for WorkshopDraft {
    const REQUIRED: &'static [&'static str] = &["title", "description", "date"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "description" => Some(self.description.clone()),
            "date" => Some(self.date.clone()),
            "registration_link" => Some(self.registration_link.clone()),
            "image_url" => Some(self.image_url.clone()),
            "is_active" => Some(self.is_active.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "date" => self.date = value.to_string(),
            "registration_link" => self.registration_link = value.to_string(),
            "image_url" => self.image_url = value.to_string(),
            "is_active" => self.is_active = parse_bool("is_active", value)?,
            _ => return Err(unknown_field("workshop", name)),
        }
        Ok(())
    }
}
