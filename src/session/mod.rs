pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::AppResult;

/// Durable key holding the operator's bearer token
pub const TOKEN_KEY: &str = "adminToken";
/// Durable key holding the operator's identity (email)
pub const IDENTITY_KEY: &str = "adminEmail";

/// Token and identity, always present or absent together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Credentials {
    token: Option<String>,
    identity: Option<String>,
}

impl Credentials {
    fn paired(token: Option<String>, identity: Option<String>) -> Self {
        match (non_blank(token), non_blank(identity)) {
            (Some(token), Some(identity)) => Self {
                token: Some(token),
                identity: Some(identity),
            },
            _ => Self::default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Operator authentication session
///
/// Shared by explicit reference (`Arc<Session>`); every change is written
/// through to the backing store and the store is read once in [`Session::load`].
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    credentials: RwLock<Credentials>,
}

impl Session {
    /// Restore the session from durable storage
    pub fn load(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let token = store.get(TOKEN_KEY)?;
        let identity = store.get(IDENTITY_KEY)?;
        let credentials = Credentials::paired(token.clone(), identity.clone());

        let session = Self {
            store,
            credentials: RwLock::new(credentials.clone()),
        };

        // A lone key cannot form a session; drop it so storage matches memory
        if credentials.token.is_none() && (token.is_some() || identity.is_some()) {
            tracing::warn!("Discarding incomplete persisted session");
            session.persist(&credentials)?;
        }

        Ok(session)
    }

    /// Install a new session, replacing any prior one
    pub fn login(&self, token: &str, identity: &str) -> AppResult<()> {
        let credentials =
            Credentials::paired(Some(token.to_string()), Some(identity.to_string()));
        if credentials.token.is_none() {
            tracing::warn!("Login with blank token or identity; session cleared");
        }
        self.replace(credentials)
    }

    /// Clear token and identity together
    pub fn logout(&self) -> AppResult<()> {
        self.replace(Credentials::default())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read()
            .token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn identity(&self) -> Option<String> {
        self.read().identity.clone()
    }

    fn replace(&self, credentials: Credentials) -> AppResult<()> {
        *self.write() = credentials.clone();
        self.persist(&credentials).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to persist session");
        })
    }

    /// Token and identity land in one store write
    fn persist(&self, credentials: &Credentials) -> AppResult<()> {
        self.store.write_batch(&[
            (TOKEN_KEY, credentials.token.as_deref()),
            (IDENTITY_KEY, credentials.identity.as_deref()),
        ])
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        // Credentials are replaced wholesale, so a poisoned lock still holds a consistent value
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("Session")
            .field("identity", &self.identity())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_session() -> (MemoryStore, Session) {
        let store = MemoryStore::new();
        let session = Session::load(Arc::new(store.clone())).unwrap();
        (store, session)
    }

    #[test]
    fn test_fresh_store_has_no_session() {
        let (store, session) = memory_session();

        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.identity(), None);
        assert!(!store.contains(TOKEN_KEY));
    }

    #[test]
    fn test_login_writes_both_keys() {
        let (store, session) = memory_session();

        session.login("tok-1", "ops@example.com").unwrap();

        assert!(session.is_authenticated());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            store.get(IDENTITY_KEY).unwrap().as_deref(),
            Some("ops@example.com")
        );
    }

    #[test]
    fn test_login_overwrites_prior_session() {
        let (_store, session) = memory_session();

        session.login("tok-1", "first@example.com").unwrap();
        session.login("tok-2", "second@example.com").unwrap();

        assert_eq!(session.token().as_deref(), Some("tok-2"));
        assert_eq!(session.identity().as_deref(), Some("second@example.com"));
    }

    #[test]
    fn test_logout_removes_keys() {
        let (store, session) = memory_session();

        session.login("tok-1", "ops@example.com").unwrap();
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(!store.contains(TOKEN_KEY));
        assert!(!store.contains(IDENTITY_KEY));
    }

    #[test]
    fn test_blank_login_clears_session() {
        let (store, session) = memory_session();

        session.login("tok-1", "ops@example.com").unwrap();
        session.login("", "ops@example.com").unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);
        assert!(!store.contains(IDENTITY_KEY));
    }

    #[test]
    fn test_lone_persisted_key_is_discarded() {
        let store = MemoryStore::new();
        store.set(IDENTITY_KEY, "ops@example.com").unwrap();

        let session = Session::load(Arc::new(store.clone())).unwrap();

        assert!(!session.is_authenticated());
        assert_eq!(session.identity(), None);
        assert!(!store.contains(IDENTITY_KEY));
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(crate::error::AppError::Storage("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_persist_failure_still_updates_memory() {
        let session = Session::load(Arc::new(ReadOnlyStore)).unwrap();

        let result = session.login("tok-1", "ops@example.com");

        assert!(matches!(result, Err(crate::error::AppError::Storage(_))));
        assert!(session.is_authenticated());
    }

    /// Accepts only batched writes and records each one
    #[derive(Default)]
    struct BatchOnlyStore {
        batches: std::sync::Mutex<Vec<Vec<(String, Option<String>)>>>,
    }

    impl KeyValueStore for BatchOnlyStore {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> AppResult<()> {
            Err(crate::error::AppError::Storage(format!("unpaired write of {}", key)))
        }

        fn remove(&self, key: &str) -> AppResult<()> {
            Err(crate::error::AppError::Storage(format!("unpaired removal of {}", key)))
        }

        fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> AppResult<()> {
            let batch = changes
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                .collect();
            self.batches.lock().unwrap().push(batch);
            Ok(())
        }
    }

    #[test]
    fn test_pair_is_written_in_one_batch() {
        let store = Arc::new(BatchOnlyStore::default());
        let session = Session::load(store.clone()).unwrap();

        session.login("tok-1", "ops@example.com").unwrap();
        session.logout().unwrap();

        let batches = store.batches.lock().unwrap();
        assert_eq!(
            *batches,
            vec![
                vec![
                    (TOKEN_KEY.to_string(), Some("tok-1".to_string())),
                    (IDENTITY_KEY.to_string(), Some("ops@example.com".to_string())),
                ],
                vec![(TOKEN_KEY.to_string(), None), (IDENTITY_KEY.to_string(), None)],
            ]
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let (_store, session) = memory_session();
        session.login("secret-token", "ops@example.com").unwrap();

        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("ops@example.com"));
    }
}
