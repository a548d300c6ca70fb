use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{unknown_field, Access, Draft, Operations, Resource, Shape};

/// Text shown when the backend has never stored any about content
pub const DEFAULT_ABOUT: &str = "Dhadak is the official dance committee of our college. We are a vibrant community of dancers passionate about various dance forms and cultural expression.";

/// The single about-page text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    /// Present once stored; the default text has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub content: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AboutDraft {
    pub content: String,
}

impl Resource for AboutContent {
    type Draft = AboutDraft;

    const COLLECTION: &'static str = "about";
    const LABEL: &'static str = "About content";
    const SHAPE: Shape = Shape::Singleton;
    const OPERATIONS: Operations = Operations {
        list: Access::Public,
        create: Access::Disabled,
        update: Access::Operator,
        delete: Access::Disabled,
    };

    fn id(&self) -> Option<&str> {
        None
    }

    fn to_draft(&self) -> AboutDraft {
        AboutDraft {
            content: self.content.clone(),
        }
    }
}

impl Draft for AboutDraft {
    const REQUIRED: &'static [&'static str] = &["content"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "content" => Some(self.content.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "content" => self.content = value.to_string(),
            _ => return Err(unknown_field("about content", name)),
        }
        Ok(())
    }
}
