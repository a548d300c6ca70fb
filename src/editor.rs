//! Operator editor: one mounted collection panel at a time plus the auth flow.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::Backend;
use crate::controller::{Controller, Notice, Notifier};
use crate::error::{AppError, AppResult};
use crate::gateway::AuthGateway;
use crate::models::{
    AboutContent, Achievement, AuthResponse, ContactSubmission, Draft, GalleryPhoto, Resource,
    TeamMember, Workshop,
};
use crate::session::Session;

/// Editor tabs, one per collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Gallery,
    Achievements,
    Team,
    Workshop,
    About,
    Contact,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Gallery,
        Tab::Achievements,
        Tab::Team,
        Tab::Workshop,
        Tab::About,
        Tab::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Gallery => "gallery",
            Tab::Achievements => "achievements",
            Tab::Team => "team",
            Tab::Workshop => "workshop",
            Tab::About => "about",
            Tab::Contact => "contact",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gallery" | "photos" => Ok(Tab::Gallery),
            "achievements" => Ok(Tab::Achievements),
            "team" => Ok(Tab::Team),
            "workshop" | "workshops" => Ok(Tab::Workshop),
            "about" => Ok(Tab::About),
            "contact" | "messages" => Ok(Tab::Contact),
            other => Err(AppError::Validation(format!("unknown tab '{}'", other))),
        }
    }
}

/// Type-erased view of a mounted controller
///
/// Items and drafts cross this seam as JSON so renderers need not know the
/// collection's concrete types.
#[async_trait]
pub trait Panel: Send + Sync {
    fn label(&self) -> &'static str;
    fn required_fields(&self) -> &'static [&'static str];

    async fn mount(&self) -> AppResult<()>;
    async fn refresh(&self) -> AppResult<()>;
    fn items(&self) -> AppResult<Vec<Value>>;

    fn open_for_create(&self) -> AppResult<()>;
    fn open_for_edit(&self, id: &str) -> AppResult<()>;
    fn open_singleton(&self) -> AppResult<()>;
    fn set_field(&self, name: &str, value: &str) -> AppResult<()>;
    fn draft(&self) -> AppResult<Option<Value>>;
    fn is_composing(&self) -> bool;
    fn cancel(&self) -> AppResult<()>;
    async fn submit(&self) -> AppResult<()>;

    fn request_delete(&self, id: &str) -> AppResult<()>;
    fn cancel_delete(&self);
    fn pending_delete(&self) -> Option<String>;
    async fn confirm_delete(&self) -> AppResult<()>;
}

#[async_trait]
impl<R: Resource> Panel for Controller<R> {
    fn label(&self) -> &'static str {
        R::LABEL
    }

    fn required_fields(&self) -> &'static [&'static str] {
        <R::Draft as Draft>::REQUIRED
    }

    async fn mount(&self) -> AppResult<()> {
        Controller::mount(self).await
    }

    async fn refresh(&self) -> AppResult<()> {
        Controller::refresh(self).await
    }

    fn items(&self) -> AppResult<Vec<Value>> {
        Controller::items(self)
            .iter()
            .map(|item| serde_json::to_value(item).map_err(AppError::from))
            .collect()
    }

    fn open_for_create(&self) -> AppResult<()> {
        Controller::open_for_create(self)
    }

    fn open_for_edit(&self, id: &str) -> AppResult<()> {
        Controller::open_for_edit(self, id)
    }

    fn open_singleton(&self) -> AppResult<()> {
        Controller::open_singleton(self)
    }

    fn set_field(&self, name: &str, value: &str) -> AppResult<()> {
        Controller::set_field(self, name, value)
    }

    fn draft(&self) -> AppResult<Option<Value>> {
        Controller::draft(self)
            .map(|draft| serde_json::to_value(draft).map_err(AppError::from))
            .transpose()
    }

    fn is_composing(&self) -> bool {
        Controller::mode(self).is_composing()
    }

    fn cancel(&self) -> AppResult<()> {
        Controller::cancel(self)
    }

    async fn submit(&self) -> AppResult<()> {
        Controller::submit(self).await
    }

    fn request_delete(&self, id: &str) -> AppResult<()> {
        Controller::request_delete(self, id)
    }

    fn cancel_delete(&self) {
        Controller::cancel_delete(self)
    }

    fn pending_delete(&self) -> Option<String> {
        Controller::pending_delete(self)
    }

    async fn confirm_delete(&self) -> AppResult<()> {
        Controller::confirm_delete(self).await
    }
}

/// Operator shell: authentication plus the currently selected panel
pub struct EditorShell {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    auth: AuthGateway,
    active: Option<(Tab, Box<dyn Panel>)>,
}

impl EditorShell {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth: AuthGateway::new(backend.clone()),
            backend,
            session,
            notifier,
            active: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<()> {
        let result = self.auth.login(email, password).await;
        self.install(result, "Login successful")
    }

    pub async fn register(&self, email: &str, password: &str) -> AppResult<()> {
        let result = self.auth.register(email, password).await;
        self.install(result, "Registration successful")
    }

    /// Clear the session and unmount the active panel
    pub fn logout(&mut self) -> AppResult<()> {
        self.active = None;
        self.session.logout()?;
        self.notifier.notify(Notice::success("Logged out successfully"));
        Ok(())
    }

    /// Replace the active panel with a freshly mounted one
    ///
    /// The panel stays selected even when its initial list fails.
    pub async fn select(&mut self, tab: Tab) -> AppResult<&dyn Panel> {
        tracing::debug!(tab = %tab, "Selecting editor tab");
        self.active = None;
        let panel = self.build(tab);
        let mounted = panel.mount().await;
        let (_, panel) = self.active.insert((tab, panel));
        mounted.map(move |_| &**panel)
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.active.as_ref().map(|(tab, _)| *tab)
    }

    pub fn active(&self) -> Option<&dyn Panel> {
        self.active.as_ref().map(|(_, panel)| panel.as_ref())
    }

    fn build(&self, tab: Tab) -> Box<dyn Panel> {
        match tab {
            Tab::Gallery => Box::new(self.controller::<GalleryPhoto>()),
            Tab::Achievements => Box::new(self.controller::<Achievement>()),
            Tab::Team => Box::new(self.controller::<TeamMember>()),
            Tab::Workshop => Box::new(self.controller::<Workshop>()),
            Tab::About => Box::new(self.controller::<AboutContent>()),
            Tab::Contact => Box::new(self.controller::<ContactSubmission>()),
        }
    }

    fn controller<R: Resource>(&self) -> Controller<R> {
        Controller::new(
            self.backend.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    fn install(&self, result: AppResult<AuthResponse>, success: &str) -> AppResult<()> {
        match result {
            Ok(auth) => {
                self.session.login(&auth.token, &auth.email)?;
                tracing::info!(operator = %auth.email, "Operator authenticated");
                self.notifier.notify(Notice::success(success));
                Ok(())
            }
            Err(err) => {
                let message = match &err {
                    AppError::Rejected {
                        detail: Some(detail),
                        ..
                    } => detail.clone(),
                    _ => "Authentication failed".to_string(),
                };
                self.notifier.notify(Notice::failure(message));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_parsing_accepts_aliases() {
        assert_eq!("Workshops".parse::<Tab>().unwrap(), Tab::Workshop);
        assert_eq!("photos".parse::<Tab>().unwrap(), Tab::Gallery);
        assert!("events".parse::<Tab>().is_err());
    }

    #[test]
    fn test_tab_names_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(tab.as_str().parse::<Tab>().unwrap(), tab);
        }
    }
}
