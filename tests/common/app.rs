use std::sync::Arc;

use dhadak_admin::backend::MemoryBackend;
use dhadak_admin::controller::{Controller, RecordingNotifier};
use dhadak_admin::editor::EditorShell;
use dhadak_admin::models::Resource;
use dhadak_admin::public::PublicSite;
use dhadak_admin::session::{MemoryStore, Session};

pub const OPERATOR_EMAIL: &str = "ops@dhadak.test";
pub const OPERATOR_PASSWORD: &str = "TestPassword123!";

/// Test application wrapper: in-memory backend, store, session and notices
pub struct TestApp {
    pub backend: MemoryBackend,
    pub store: MemoryStore,
    pub session: Arc<Session>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Create a test application with no operator logged in
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let session =
            Session::load(Arc::new(store.clone())).expect("Failed to load test session");

        Self {
            backend: MemoryBackend::new(),
            store,
            session: Arc::new(session),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    /// Create a test application with a registered, logged-in operator
    pub async fn logged_in() -> Self {
        let app = Self::new();
        app.editor()
            .register(OPERATOR_EMAIL, OPERATOR_PASSWORD)
            .await
            .expect("Failed to register test operator");
        app.backend.clear_requests().await;
        app.notifier.clear();
        app
    }

    pub fn controller<R: Resource>(&self) -> Controller<R> {
        Controller::new(
            Arc::new(self.backend.clone()),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn editor(&self) -> EditorShell {
        EditorShell::new(
            Arc::new(self.backend.clone()),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn public_site(&self) -> PublicSite {
        PublicSite::new(Arc::new(self.backend.clone()))
    }

    /// Load a fresh session from the same store, as after a restart
    pub fn restart_session(&self) -> Session {
        Session::load(Arc::new(self.store.clone())).expect("Failed to reload session")
    }
}
