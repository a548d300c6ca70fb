use std::sync::Arc;

use crate::backend::Backend;
use crate::error::AppResult;
use crate::gateway::Gateway;
use crate::models::{
    AboutContent, Achievement, ContactDraft, ContactSubmission, Draft, GalleryPhoto, TeamMember,
    Workshop,
};

/// Everything the public site shows, fetched anonymously
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContent {
    pub gallery: Vec<GalleryPhoto>,
    pub achievements: Vec<Achievement>,
    pub team: Vec<TeamMember>,
    pub workshops: Vec<Workshop>,
    pub about: AboutContent,
}

impl SiteContent {
    /// Workshops open for display; the editor still sees every workshop
    pub fn active_workshops(&self) -> Vec<&Workshop> {
        self.workshops.iter().filter(|w| w.is_active).collect()
    }
}

/// Read-only consumer of the content API
#[derive(Clone)]
pub struct PublicSite {
    backend: Arc<dyn Backend>,
}

impl PublicSite {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch all public collections concurrently; any failure fails the load
    pub async fn load(&self) -> AppResult<SiteContent> {
        let gallery = Gateway::<GalleryPhoto>::new(self.backend.clone());
        let achievements = Gateway::<Achievement>::new(self.backend.clone());
        let team = Gateway::<TeamMember>::new(self.backend.clone());
        let workshops = Gateway::<Workshop>::new(self.backend.clone());
        let about = Gateway::<AboutContent>::new(self.backend.clone());

        let (gallery, achievements, team, workshops, about) = futures::try_join!(
            gallery.list(None),
            achievements.list(None),
            team.list(None),
            workshops.list(None),
            about.get(),
        )
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load public site"))?;

        tracing::debug!(
            photos = gallery.len(),
            achievements = achievements.len(),
            team = team.len(),
            workshops = workshops.len(),
            "Public site loaded"
        );

        Ok(SiteContent {
            gallery,
            achievements,
            team,
            workshops,
            about,
        })
    }

    /// Send a visitor message; no session is involved
    pub async fn submit_contact(&self, name: &str, email: &str, message: &str) -> AppResult<String> {
        let draft = ContactDraft::new(name, email, message);
        draft.validate()?;
        Gateway::<ContactSubmission>::new(self.backend.clone())
            .submit(&draft)
            .await
    }
}
