use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use snafu::ResultExt;

use crate::error::{EntropySnafu, SessionResult, StoreResult};

/// Storage key the thread id is kept under.
pub const DEFAULT_SESSION_KEY: &str = "chat_thread_id";

const SESSION_PREFIX: &str = "session_";
const SESSION_TOKEN_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
// Largest multiple of 36 that fits in a byte; higher bytes are rejected to keep digits uniform.
const BASE36_REJECTION_BOUND: u8 = 252;

/// Opaque token scoping one conversation across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a stored value. Blank values are treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Generates `session_` followed by nine random base-36 digits.
    pub fn generate() -> SessionResult<Self> {
        let mut token = String::with_capacity(SESSION_PREFIX.len() + SESSION_TOKEN_LEN);
        token.push_str(SESSION_PREFIX);

        let mut buffer = [0u8; 16];
        while token.len() < SESSION_PREFIX.len() + SESSION_TOKEN_LEN {
            getrandom::fill(&mut buffer).context(EntropySnafu {
                stage: "generate-session-id",
            })?;

            for byte in buffer {
                if byte >= BASE36_REJECTION_BOUND {
                    continue;
                }
                token.push(char::from(BASE36[usize::from(byte % 36)]));
                if token.len() == SESSION_PREFIX.len() + SESSION_TOKEN_LEN {
                    break;
                }
            }
        }

        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Persistent string storage the widget keeps its session id in.
///
/// Browser hosts back this with `localStorage`; other hosts pick whatever
/// survives a restart for them.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Process-local store. Used when no persistent storage is reachable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads the session id under `key`, creating and storing one if absent.
///
/// Storage failures only cost persistence: the freshly generated id is still
/// returned so the page keeps a stable id for its lifetime.
pub fn initialize_session(store: &impl KeyValueStore, key: &str) -> SessionResult<SessionId> {
    match store.get(key) {
        Ok(Some(raw)) => {
            if let Some(session_id) = SessionId::parse(&raw) {
                tracing::debug!(%session_id, "reusing stored session id");
                return Ok(session_id);
            }
        }
        Ok(None) => {}
        Err(error) => {
            tracing::warn!(%error, key, "session store read failed, generating a new id");
        }
    }

    let session_id = SessionId::generate()?;
    if let Err(error) = store.set(key, session_id.as_str()) {
        tracing::warn!(%error, key, "failed to persist session id");
    }

    tracing::info!(%session_id, "created new session id");
    Ok(session_id)
}
