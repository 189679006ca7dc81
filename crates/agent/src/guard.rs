//! Per-user in-flight guard
//!
//! At most one request per user is processed at a time. A second request
//! arriving while the first is running is rejected immediately instead of
//! queued. The ticket releases its user on drop, so early returns and
//! errors never leave a user stuck.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::AgentError;

/// Set of users with a request in flight
#[derive(Debug, Clone, Default)]
pub struct UserGuard {
    active: Arc<Mutex<HashSet<String>>>,
}

impl UserGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `user_id`, or fail with `Busy` if it is already claimed
    pub fn try_acquire(&self, user_id: &str) -> Result<UserTicket, AgentError> {
        let mut active = self.active.lock();
        if !active.insert(user_id.to_string()) {
            tracing::debug!(user_id, "Rejected concurrent request");
            return Err(AgentError::Busy {
                user_id: user_id.to_string(),
            });
        }
        Ok(UserTicket {
            user_id: user_id.to_string(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.active.lock().contains(user_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

/// Proof that a user's request is in flight; releases on drop
#[derive(Debug)]
pub struct UserTicket {
    user_id: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl UserTicket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Drop for UserTicket {
    fn drop(&mut self) {
        self.active.lock().remove(&self.user_id);
    }
}
