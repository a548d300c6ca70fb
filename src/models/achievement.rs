use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{is_blank, unknown_field, Access, Draft, Operations, Resource, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Free-form display date, e.g. "March 2024"
    pub date: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AchievementDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub image_url: String,
    pub date: String,
}

impl Resource for Achievement {
    type Draft = AchievementDraft;

    const COLLECTION: &'static str = "achievements";
    const LABEL: &'static str = "Achievement";
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

    fn to_draft(&self) -> AchievementDraft {
        AchievementDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
            date: self.date.clone(),
        }
    }
}

impl Draft for AchievementDraft {
    const REQUIRED: &'static [&'static str] = &["title", "description", "date"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "title" => Some(self.title.clone()),
            "description" => Some(self.description.clone()),
            "image_url" => Some(self.image_url.clone()),
            "date" => Some(self.date.clone()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "image_url" => self.image_url = value.to_string(),
            "date" => self.date = value.to_string(),
            _ => return Err(unknown_field("achievement", name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_copies_every_field() {
        let item = Achievement {
            id: "a1".to_string(),
            title: "Regional Final".to_string(),
            description: "First place".to_string(),
            image_url: None,
            date: "March 2024".to_string(),
            created_at: None,
        };

        let draft = item.to_draft();
        assert_eq!(draft.title, "Regional Final");
        assert_eq!(draft.image_url, "");
        assert_eq!(draft.date, "March 2024");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let mut draft = AchievementDraft::default();
        draft.set_field("description", "Won").unwrap();

        assert_eq!(draft.missing_required(), vec!["title", "date"]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut draft = AchievementDraft::default();
        assert!(draft.set_field("venue", "Hall").is_err());
    }
}
