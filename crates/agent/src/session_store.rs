//! Durable user sessions
//!
//! Every mutation rewrites the whole session map to disk while holding a
//! write lock, so concurrent writers never interleave partial snapshots.
//! Write failures are logged and the in-memory state stays authoritative.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use design_mentor_core::storage::{read_json_or_default, write_json_atomic};
use design_mentor_core::{ExpertiseLevel, ResponseStyle, SessionAnalytics, UserSession};

type SessionMap = HashMap<String, UserSession>;

/// User session store backed by a JSON file
pub struct SessionStore {
    path: Option<PathBuf>,
    sessions: RwLock<SessionMap>,
    /// Held across mutate-snapshot-write
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Open the sessions file; a missing or unreadable file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let sessions: SessionMap = match read_json_or_default(&path) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load sessions, starting empty");
                SessionMap::new()
            }
        };
        tracing::info!(users = sessions.len(), "Loaded user sessions");

        Self {
            path: Some(path),
            sessions: RwLock::new(sessions),
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            sessions: RwLock::new(SessionMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Session for `user_id`, creating and persisting a fresh one if needed
    pub fn get_or_create(&self, user_id: &str) -> UserSession {
        if let Some(session) = self.get(user_id) {
            return session;
        }
        self.mutate(user_id, |_| ())
    }

    pub fn get(&self, user_id: &str) -> Option<UserSession> {
        self.sessions.read().get(user_id).cloned()
    }

    /// Set the label attached to subsequent history entries
    pub fn update_context(&self, user_id: &str, context: &str) -> UserSession {
        self.mutate(user_id, |s| s.current_context = context.to_string())
    }

    pub fn append_history(&self, user_id: &str, message: &str) -> UserSession {
        let now = Utc::now();
        self.mutate(user_id, |s| s.push_history(message, now))
    }

    pub fn record_search(&self, user_id: &str, query: &str) -> UserSession {
        self.mutate(user_id, |s| {
            s.search_count += 1;
            s.last_search = Some(query.to_string());
        })
    }

    pub fn get_analytics(&self, user_id: &str) -> SessionAnalytics {
        self.get_or_create(user_id).analytics(Utc::now())
    }

    pub fn set_expertise_level(&self, user_id: &str, level: ExpertiseLevel) -> UserSession {
        self.mutate(user_id, |s| s.set_expertise_level(level))
    }

    /// Returns whether the tool is a favorite after the toggle
    pub fn toggle_favorite_tool(&self, user_id: &str, tool: &str) -> bool {
        let mut now_set = false;
        self.mutate(user_id, |s| now_set = s.toggle_favorite_tool(tool));
        now_set
    }

    /// Returns whether the interest is set after the toggle
    pub fn toggle_interest(&self, user_id: &str, interest: &str) -> bool {
        let mut now_set = false;
        self.mutate(user_id, |s| now_set = s.toggle_interest(interest));
        now_set
    }

    pub fn set_response_style(&self, user_id: &str, style: ResponseStyle) -> UserSession {
        self.mutate(user_id, |s| s.preferences.response_style = style.as_str().to_string())
    }

    pub fn complete_onboarding(&self, user_id: &str) -> UserSession {
        self.mutate(user_id, |s| s.preferences.onboarding_completed = true)
    }

    /// Apply `f` to the user's session (creating it if needed) and persist
    pub fn mutate<F>(&self, user_id: &str, f: F) -> UserSession
    where
        F: FnOnce(&mut UserSession),
    {
        let _guard = self.write_lock.lock();
        let (updated, snapshot) = {
            let mut sessions = self.sessions.write();
            let session = sessions
                .entry(user_id.to_string())
                .or_insert_with(|| UserSession::new(user_id));
            f(session);
            let updated = session.clone();
            (updated, persisted_snapshot(&sessions))
        };
        self.persist(&snapshot);
        updated
    }

    /// Write the current map to disk
    pub fn flush(&self) {
        let _guard = self.write_lock.lock();
        let snapshot = persisted_snapshot(&self.sessions.read());
        self.persist(&snapshot);
    }

    fn persist(&self, snapshot: &SessionMap) {
        let Some(ref path) = self.path else {
            return;
        };
        if let Err(e) = write_json_atomic(path, snapshot) {
            tracing::warn!(error = %e, "Failed to persist user sessions");
        }
    }
}

fn persisted_snapshot(sessions: &SessionMap) -> SessionMap {
    sessions
        .iter()
        .map(|(id, s)| (id.clone(), s.to_persisted()))
        .collect()
}
