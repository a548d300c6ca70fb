// Library crate for the Dhadak content editor
// Exports modules for use by the operator CLI and tests

pub mod backend;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod models;
pub mod public;
pub mod session;

pub use backend::{Backend, HttpBackend, MemoryBackend};
pub use config::Config;
pub use controller::{Controller, LogNotifier, Notice, Notifier, RecordingNotifier};
pub use editor::{EditorShell, Panel, Tab};
pub use error::{AppError, AppResult};
pub use public::{PublicSite, SiteContent};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session};
