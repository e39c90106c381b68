//! Session registry
//!
//! Authoritative name to session directory. Every structural change happens
//! under one write lock; lookups and snapshots share a read lock. No I/O is
//! ever performed while the lock is held.

use super::Session;
use chat_core::DomainError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Directory of online sessions keyed by display name
pub struct Registry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a session under its current name
    pub fn add(&self, session: Arc<Session>) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write();
        let name = session.name();

        if sessions.contains_key(&name) {
            return Err(DomainError::NameTaken(name));
        }

        tracing::debug!(session_id = %session.id(), name = %name, "Session registered");
        sessions.insert(name, session);

        Ok(())
    }

    /// Remove whatever session holds `name`
    pub fn remove(&self, name: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(name);

        if let Some(session) = &removed {
            tracing::debug!(session_id = %session.id(), name = %name, "Session unregistered");
        }

        removed
    }

    /// Remove `session` if it is still registered
    ///
    /// The entry is matched by session id, so a session torn down late can
    /// never unregister another session that now holds its old name.
    pub fn remove_session(&self, session: &Session) -> bool {
        let mut sessions = self.sessions.write();
        // The name cannot change while the write lock is held
        let name = session.name();

        match sessions.get(&name) {
            Some(entry) if entry.id() == session.id() => {
                sessions.remove(&name);
                tracing::debug!(session_id = %session.id(), name = %name, "Session unregistered");
                true
            }
            _ => false,
        }
    }

    /// Move the session at `old` to `new`
    ///
    /// The key and the session's own name change together. Fails with
    /// `NameTaken` if `new` is held by any session, including this one.
    pub fn rename(&self, old: &str, new: &str) -> Result<Arc<Session>, DomainError> {
        let mut sessions = self.sessions.write();

        if sessions.contains_key(new) {
            return Err(DomainError::NameTaken(new.to_string()));
        }

        let session = sessions
            .remove(old)
            .ok_or_else(|| DomainError::UserNotFound(old.to_string()))?;

        session.set_name(new);
        sessions.insert(new.to_string(), Arc::clone(&session));

        Ok(session)
    }

    /// Find the session holding `name`
    pub fn lookup(&self, name: &str) -> Result<Arc<Session>, DomainError> {
        self.sessions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::UserNotFound(name.to_string()))
    }

    /// Copy out every registered session
    ///
    /// Order is unspecified.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions.read().values().cloned().collect()
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.sessions.read().contains_key(name)
    }

    /// Number of online sessions
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("sessions", &self.len())
            .finish()
    }
}
