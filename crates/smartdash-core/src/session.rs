// ── Durable session store ──
//
// A tiny key/value port holding the bearer token and user id across
// process restarts. Writes are best-effort: failures are logged and
// swallowed so a broken disk never fails an auth transition.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use smartdash_api::CredentialSource;

/// Keys the session store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKey {
    #[serde(rename = "token")]
    Token,
    #[serde(rename = "userId")]
    UserId,
}

impl SessionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::UserId => "userId",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key/value storage for the session.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<String>;
    fn set(&self, key: SessionKey, value: &str);
    fn remove(&self, key: SessionKey);
}

// ── In-memory ───────────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if a previous run had logged in.
    pub fn with_session(user_id: &str, token: &str) -> Self {
        let store = Self::new();
        store.set(SessionKey::UserId, user_id);
        store.set(SessionKey::Token, token);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: SessionKey, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_owned());
    }

    fn remove(&self, key: SessionKey) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }
}

// ── JSON file ───────────────────────────────────────────────────────

/// JSON object on disk (`{"token": "...", "userId": "..."}`), rewritten
/// on every mutation. A missing or unreadable file reads as empty.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HashMap<SessionKey, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read session file");
                return HashMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring malformed session file");
            HashMap::new()
        })
    }

    fn persist(&self, entries: &HashMap<SessionKey, String>) {
        if let Err(e) = self.write_file(entries) {
            warn!(path = %self.path.display(), error = %e, "cannot write session file");
        }
    }

    fn write_file(&self, entries: &HashMap<SessionKey, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<SessionKey, String>)) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load();
        f(&mut entries);
        self.persist(&entries);
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().remove(&key)
    }

    fn set(&self, key: SessionKey, value: &str) {
        self.update(|entries| {
            entries.insert(key, value.to_owned());
        });
    }

    fn remove(&self, key: SessionKey) {
        self.update(|entries| {
            entries.remove(&key);
        });
    }
}

// ── Gateway adapter ─────────────────────────────────────────────────

/// Feeds the gateway's auth headers straight from the durable store, so
/// every request sees the session as it is at send time.
pub struct SessionCredentials {
    store: Arc<dyn SessionStore>,
}

impl SessionCredentials {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl CredentialSource for SessionCredentials {
    fn token(&self) -> Option<SecretString> {
        self.store.get(SessionKey::Token).map(SecretString::from)
    }

    fn user_id(&self) -> Option<String> {
        self.store.get(SessionKey::UserId)
    }
}
