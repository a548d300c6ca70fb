use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{is_blank, unknown_field, Access, Draft, Operations, Resource, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Photo form; photos are added and removed, never edited
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryDraft {
    pub image_url: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub caption: String,
}

impl Resource for GalleryPhoto {
    type Draft = GalleryDraft;

    const COLLECTION: &'static str = "gallery";
    const LABEL: &'static str = "Photo";
    const SHAPE: Shape = Shape::Collection;
    const OPERATIONS: Operations = Operations {
        list: Access::Public,
        create: Access::Operator,
        update: Access::Disabled,
        delete: Access::Operator,
    };

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_draft(&self) -> GalleryDraft {
        GalleryDraft {
            image_url: self.image_url.clone(),
            caption: self.caption.clone().unwrap_or_default(),
        }
    }
}

impl Draft for GalleryDraft {
    const REQUIRED: &'static [&'static str] = &["image_url"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "image_url" => Some(self.image_url.clone()),
            "caption" => Some(self.caption.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "image_url" => self.image_url = value.to_string(),
            "caption" => self.caption = value.to_string(),
            _ => return Err(unknown_field("photo", name)),
        }
        Ok(())
    }
}
