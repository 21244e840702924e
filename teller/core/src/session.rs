//! Session Store
//!
//! Durable client-side session state: the bearer token, user id and cached
//! profile are persisted together as one JSON file under the XDG data
//! directory, loaded at startup and cleared together on logout.
//!
//! The store is the sole owner of session state. Controllers hold cloned
//! handles and read through them; only the auth controller writes. When
//! the disk is unusable the store degrades to memory-only and the app
//! keeps running.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::models::Session;

/// Errors raised when persisting or clearing the session file
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The session file could not be read or written
    #[error("session file {}: {source}", path.display())]
    Io {
        /// The file that was touched
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// The session record could not be encoded
    #[error("session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

struct Inner {
    session: Option<Session>,
    path: Option<PathBuf>,
}

/// Shared handle to the client session
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl SessionStore {
    /// Default session file location under the XDG data directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("teller").join("session.json"))
    }

    /// Open a store backed by `path`, loading any previously saved session.
    ///
    /// A missing file means no session; an unreadable or corrupt file is
    /// logged and treated the same way.
    pub fn open(path: PathBuf) -> Self {
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding corrupt session file");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "session file unreadable");
                None
            }
        };

        Self {
            inner: Arc::new(Mutex::new(Inner {
                session,
                path: Some(path),
            })),
        }
    }

    /// Open a memory-only store (used in tests and when no data dir exists)
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session: None,
                path: None,
            })),
        }
    }

    /// Replace the current session and persist it
    pub fn store(&self, session: Session) -> Result<(), SessionStoreError> {
        let path = {
            let mut inner = self.inner.lock();
            inner.session = Some(session.clone());
            inner.path.clone()
        };

        let Some(path) = path else {
            return Ok(());
        };
        let encoded = serde_json::to_string_pretty(&session)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SessionStoreError::Io {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&path, encoded).map_err(|source| SessionStoreError::Io { path, source })
    }

    /// Drop the current session and remove the session file
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        let path = {
            let mut inner = self.inner.lock();
            inner.session = None;
            inner.path.clone()
        };

        let Some(path) = path else {
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::Io { path, source }),
        }
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    /// The bearer token, when signed in
    pub fn token(&self) -> Option<String> {
        self.inner.lock().session.as_ref().map(|s| s.token.clone())
    }

    /// The signed-in user id
    pub fn user_id(&self) -> Option<i64> {
        self.inner.lock().session.as_ref().map(|s| s.user_id)
    }

    /// Whether a session is present
    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().session.is_some()
    }
}
