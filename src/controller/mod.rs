pub mod notify;

pub use notify::{LogNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier};

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::Backend;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;
use crate::models::{Draft, Resource, Shape};
use crate::session::Session;

/// What a submit will do with the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Create a new item; the server assigns the id
    New,
    /// Replace the item with this id
    Existing(String),
    /// Replace the one implicit instance
    Singleton,
}

/// Form visibility of a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Composing(Target),
}

impl Mode {
    pub fn is_composing(&self) -> bool {
        matches!(self, Mode::Composing(_))
    }
}

/// Everything a renderer needs to draw one collection panel
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R: Resource> {
    pub items: Vec<R>,
    pub mode: Mode,
    /// Present only while composing
    pub draft: Option<R::Draft>,
    pub submitting: bool,
    pub pending_delete: Option<String>,
}

struct State<R: Resource> {
    items: Vec<R>,
    mode: Mode,
    draft: R::Draft,
    submitting: bool,
    pending_delete: Option<String>,
}

impl<R: Resource> State<R> {
    fn ensure_idle(&self) -> AppResult<()> {
        if self.mode.is_composing() {
            return Err(AppError::InvalidState(format!(
                "a {} form is already open",
                noun::<R>()
            )));
        }
        Ok(())
    }

    fn reset_form(&mut self) {
        self.mode = Mode::Idle;
        self.draft = R::Draft::default();
    }
}

/// List/create/edit/delete lifecycle of one collection
///
/// The cache is only ever replaced by a fresh list; mutations never patch it.
/// Methods take `&self` and never hold the state lock across a backend call,
/// so a controller can be shared between tasks.
pub struct Controller<R: Resource> {
    gateway: Gateway<R>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<State<R>>,
}

impl<R: Resource> Controller<R> {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway: Gateway::new(backend),
            session,
            notifier,
            state: Mutex::new(State {
                items: Vec::new(),
                mode: Mode::Idle,
                draft: R::Draft::default(),
                submitting: false,
                pending_delete: None,
            }),
        }
    }

    /// Initial load when the panel becomes visible
    pub async fn mount(&self) -> AppResult<()> {
        tracing::debug!(collection = R::COLLECTION, "Mounting controller");
        self.refresh().await
    }

    /// Replace the cache with the server's current list
    ///
    /// On failure the previous cache is kept.
    pub async fn refresh(&self) -> AppResult<()> {
        let token = self.session.token();
        match self.gateway.list(token.as_deref()).await {
            Ok(items) => {
                tracing::debug!(collection = R::COLLECTION, count = items.len(), "Cache refreshed");
                self.state().items = items;
                Ok(())
            }
            Err(err) => {
                self.fail(format!(
                    "Error fetching {}: {}",
                    R::COLLECTION,
                    err.notice_detail()
                ));
                Err(err)
            }
        }
    }

    // ============ Form ============

    pub fn open_for_create(&self) -> AppResult<()> {
        if R::SHAPE != Shape::Collection || !R::OPERATIONS.create.is_enabled() {
            return Err(unsupported::<R>("create"));
        }
        let mut state = self.state();
        state.ensure_idle()?;
        state.draft = R::Draft::default();
        state.mode = Mode::Composing(Target::New);
        Ok(())
    }

    /// Open the form pre-filled from the cached item with this id
    pub fn open_for_edit(&self, id: &str) -> AppResult<()> {
        if R::SHAPE != Shape::Collection || !R::OPERATIONS.update.is_enabled() {
            return Err(unsupported::<R>("update"));
        }
        let mut state = self.state();
        state.ensure_idle()?;
        let draft = state
            .items
            .iter()
            .find(|item| item.id() == Some(id))
            .map(R::to_draft)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", R::LABEL, id)))?;
        state.draft = draft;
        state.mode = Mode::Composing(Target::Existing(id.to_string()));
        Ok(())
    }

    /// Open the form of a singleton, pre-filled from the cached instance
    pub fn open_singleton(&self) -> AppResult<()> {
        if R::SHAPE != Shape::Singleton || !R::OPERATIONS.update.is_enabled() {
            return Err(unsupported::<R>("edit"));
        }
        let mut state = self.state();
        state.ensure_idle()?;
        let draft = state.items.first().map(R::to_draft).unwrap_or_default();
        state.draft = draft;
        state.mode = Mode::Composing(Target::Singleton);
        Ok(())
    }

    /// Discard the draft and hide the form; a no-op while idle
    pub fn cancel(&self) -> AppResult<()> {
        let mut state = self.state();
        if state.submitting {
            return Err(AppError::Busy);
        }
        state.reset_form();
        Ok(())
    }

    /// Edit the open draft in place
    pub fn draft_mut<T>(&self, edit: impl FnOnce(&mut R::Draft) -> T) -> AppResult<T> {
        let mut state = self.state();
        if !state.mode.is_composing() {
            return Err(AppError::InvalidState(format!("no {} form is open", noun::<R>())));
        }
        if state.submitting {
            return Err(AppError::Busy);
        }
        Ok(edit(&mut state.draft))
    }

    /// Set one draft field from text input
    pub fn set_field(&self, name: &str, value: &str) -> AppResult<()> {
        self.draft_mut(|draft| draft.set_field(name, value))?
    }

    /// Send the draft as a create, update or singleton replace
    ///
    /// On success the form closes and the cache is re-listed. On any failure
    /// the form stays open with the draft intact.
    pub async fn submit(&self) -> AppResult<()> {
        let (target, draft) = {
            let mut state = self.state();
            let target = match &state.mode {
                Mode::Composing(target) => target.clone(),
                Mode::Idle => {
                    return Err(AppError::InvalidState(format!(
                        "no {} form is open",
                        noun::<R>()
                    )))
                }
            };
            if state.submitting {
                return Err(AppError::Busy);
            }
            if let Err(err) = state.draft.validate() {
                drop(state);
                self.fail(save_failure::<R>(&err));
                return Err(err);
            }
            state.submitting = true;
            (target, state.draft.clone())
        };

        tracing::debug!(collection = R::COLLECTION, target = ?target, "Submitting draft");

        let token = self.session.token();
        let result = match &target {
            Target::New => self
                .gateway
                .create(&draft, token.as_deref())
                .await
                .map(|_| ()),
            Target::Existing(id) => self.gateway.update(id, &draft, token.as_deref()).await,
            Target::Singleton => self.gateway.set(&draft, token.as_deref()).await,
        };

        {
            let mut state = self.state();
            state.submitting = false;
            if result.is_ok() {
                state.reset_form();
            }
        }

        match result {
            Ok(()) => {
                let verb = match target {
                    Target::New => "added",
                    Target::Existing(_) | Target::Singleton => "updated",
                };
                self.notifier
                    .notify(Notice::success(format!("{} {}", R::LABEL, verb)));
                // A failed re-list is notified by refresh; the mutation itself stands
                self.refresh().await.ok();
                Ok(())
            }
            Err(err) => {
                self.fail(save_failure::<R>(&err));
                Err(err)
            }
        }
    }

    // ============ Delete ============

    /// Arm a delete; nothing is sent until [`Controller::confirm_delete`]
    pub fn request_delete(&self, id: &str) -> AppResult<()> {
        if R::SHAPE != Shape::Collection || !R::OPERATIONS.delete.is_enabled() {
            return Err(unsupported::<R>("delete"));
        }
        let previous = self.state().pending_delete.replace(id.to_string());
        if let Some(previous) = previous.filter(|p| p != id) {
            tracing::debug!(collection = R::COLLECTION, id = %previous, "Delete target replaced");
        }
        Ok(())
    }

    pub fn cancel_delete(&self) {
        self.state().pending_delete = None;
    }

    /// Issue the armed delete, then re-list on success
    pub async fn confirm_delete(&self) -> AppResult<()> {
        let armed = self.state().pending_delete.take();
        let id = armed.ok_or_else(|| AppError::InvalidState("no delete is armed".to_string()))?;

        let token = self.session.token();
        match self.gateway.delete(&id, token.as_deref()).await {
            Ok(()) => {
                tracing::debug!(collection = R::COLLECTION, id = %id, "Item deleted");
                self.notifier
                    .notify(Notice::success(format!("{} deleted", R::LABEL)));
                self.refresh().await.ok();
                Ok(())
            }
            Err(err) => {
                self.fail(format!(
                    "Failed to delete {}: {}",
                    noun::<R>(),
                    err.notice_detail()
                ));
                Err(err)
            }
        }
    }

    // ============ Accessors ============

    pub fn items(&self) -> Vec<R> {
        self.state().items.clone()
    }

    pub fn mode(&self) -> Mode {
        self.state().mode.clone()
    }

    pub fn draft(&self) -> Option<R::Draft> {
        let state = self.state();
        state.mode.is_composing().then(|| state.draft.clone())
    }

    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    pub fn pending_delete(&self) -> Option<String> {
        self.state().pending_delete.clone()
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        let state = self.state();
        Snapshot {
            items: state.items.clone(),
            mode: state.mode.clone(),
            draft: state.mode.is_composing().then(|| state.draft.clone()),
            submitting: state.submitting,
            pending_delete: state.pending_delete.clone(),
        }
    }

    fn fail(&self, message: String) {
        self.notifier.notify(Notice::failure(message));
    }

    fn state(&self) -> MutexGuard<'_, State<R>> {
        // Every transition leaves State consistent before any await point
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn noun<R: Resource>() -> String {
    R::LABEL.to_lowercase()
}

fn save_failure<R: Resource>(err: &AppError) -> String {
    format!("Failed to save {}: {}", noun::<R>(), err.notice_detail())
}

fn unsupported<R: Resource>(operation: &str) -> AppError {
    AppError::Unsupported(format!("{} on {}", operation, R::COLLECTION))
}
