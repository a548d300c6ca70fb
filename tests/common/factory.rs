use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

use dhadak_admin::backend::{ApiRequest, Backend, MemoryBackend};
use dhadak_admin::models::{Achievement, GalleryPhoto, TeamMember, Workshop};

/// Factory for seeding the in-memory backend
///
/// Seeding requests are cleared from the backend's request log so tests only
/// see the calls made by the code under test.
pub struct Factory<'a> {
    backend: &'a MemoryBackend,
    token: String,
}

impl<'a> Factory<'a> {
    pub fn new(backend: &'a MemoryBackend) -> Self {
        let token = backend
            .issue_token(&format!("factory-{}@dhadak.test", Uuid::new_v4()))
            .expect("Failed to issue factory token");
        Self { backend, token }
    }

    pub async fn achievement(&self, title: &str, date: &str) -> Achievement {
        self.create(
            "/api/achievements",
            json!({
                "title": title,
                "description": format!("{} description", title),
                "date": date
            }),
        )
        .await
    }

    pub async fn photo(&self, image_url: &str) -> GalleryPhoto {
        self.create("/api/gallery", json!({ "image_url": image_url }))
            .await
    }

    pub async fn team_member(&self, name: &str, order: i64) -> TeamMember {
        self.create(
            "/api/team",
            json!({
                "name": name,
                "role": "Dancer",
                "image_url": format!("https://img.dhadak.test/{}.jpg", name.to_lowercase()),
                "order": order
            }),
        )
        .await
    }

    pub async fn workshop(&self, title: &str, is_active: bool) -> Workshop {
        self.create(
            "/api/workshop",
            json!({
                "title": title,
                "description": "Open to all years",
                "date": "June 2024",
                "is_active": is_active
            }),
        )
        .await
    }

    pub async fn contact_message(&self, name: &str) {
        self.backend
            .send(ApiRequest::post(
                "/api/contact",
                json!({
                    "name": name,
                    "email": format!("{}@visitor.test", name.to_lowercase()),
                    "message": "Hello!"
                }),
            ))
            .await
            .expect("Failed to seed contact message");
        self.backend.clear_requests().await;
    }

    async fn create<T: DeserializeOwned>(&self, path: &str, body: Value) -> T {
        let created = self
            .backend
            .send(ApiRequest::post(path, body).with_token(Some(self.token.clone())))
            .await
            .expect("Failed to seed item");
        self.backend.clear_requests().await;
        serde_json::from_value(created).expect("Seeded item did not decode")
    }
}
