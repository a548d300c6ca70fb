use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::models::{is_blank, parse_int, unknown_field, Access, Draft, Operations, Resource, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub image_url: String,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    /// Display position requested by the operator; the client never sorts by it
    #[serde(default)]
    pub order: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamMemberDraft {
    pub name: String,
    pub role: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub instagram: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub linkedin: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub twitter: String,
    pub order: i64,
}

impl Resource for TeamMember {
    type Draft = TeamMemberDraft;

    const COLLECTION: &'static str = "team";
    const LABEL: &'static str = "Team member";
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

    fn to_draft(&self) -> TeamMemberDraft {
        TeamMemberDraft {
            name: self.name.clone(),
            role: self.role.clone(),
            image_url: self.image_url.clone(),
            instagram: self.instagram.clone().unwrap_or_default(),
            linkedin: self.linkedin.clone().unwrap_or_default(),
            twitter: self.twitter.clone().unwrap_or_default(),
            order: self.order,
        }
    }
}

impl Draft for TeamMemberDraft {
    const REQUIRED: &'static [&'static str] = &["name", "role", "image_url"];

    fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "role" => Some(self.role.clone()),
            "image_url" => Some(self.image_url.clone()),
            "instagram" => Some(self.instagram.clone()),
            "linkedin" => Some(self.linkedin.clone()),
            "twitter" => Some(self.twitter.clone()),
            "order" => Some(self.order.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: &str) -> AppResult<()> {
        match name {
            "name" => self.name = value.to_string(),
            "role" => self.role = value.to_string(),
            "image_url" => self.image_url = value.to_string(),
            "instagram" => self.instagram = value.to_string(),
            "linkedin" => self.linkedin = value.to_string(),
            "twitter" => self.twitter = value.to_string(),
            "order" => self.order = parse_int("order", value)?,
            _ => return Err(unknown_field("team member", name)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_defaults_to_zero_on_decode() {
        let member: TeamMember = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "name": "Asha",
            "role": "President",
            "image_url": "https://img.example.com/asha.jpg"
        }))
        .unwrap();

        assert_eq!(member.order, 0);
        assert_eq!(member.to_draft().order, 0);
    }

    #[test]
    fn test_order_rejects_non_numeric_input() {
        let mut draft = TeamMemberDraft::default();
        draft.set_field("order", "2").unwrap();
        assert_eq!(draft.order, 2);

        assert!(draft.set_field("order", "second").is_err());
        assert_eq!(draft.order, 2);
    }

    #[test]
    fn test_body_keeps_order_and_skips_blank_links() {
        let draft = TeamMemberDraft {
            name: "Asha".to_string(),
            role: "President".to_string(),
            image_url: "https://img.example.com/asha.jpg".to_string(),
            instagram: "https://instagram.com/asha".to_string(),
            order: 1,
            ..Default::default()
        };

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["order"], 1);
        assert_eq!(body["instagram"], "https://instagram.com/asha");
        assert!(body.get("linkedin").is_none());
    }
}
