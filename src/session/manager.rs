// Session management for concurrent HTTP clients
//
// Tokens are minted from the OS CSPRNG (32 random bytes, hex-encoded) so a
// guest identity carries 256 bits of entropy. Unrecognized tokens are never
// rejected: the caller silently receives a fresh guest identity. Sessions
// carry no TTL; guest state lives exactly as long as process memory.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

/// Who a session belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOwner {
    Guest,
    User(String),
}

#[derive(Debug, Clone)]
struct SessionRecord {
    owner: SessionOwner,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

/// Stable identity triple handed to request handlers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub session_id: String,
    pub is_guest: bool,
    pub user_id: Option<String>,
}

/// Concurrent session table using DashMap
pub struct SessionManager {
    sessions: DashMap<String, SessionRecord>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Resolve a request's identifying token.
    ///
    /// Known tokens are reused with their recorded owner; a missing or
    /// unrecognized token mints a fresh guest session without surfacing an
    /// error.
    pub fn resolve(&self, token: Option<&str>) -> SessionIdentity {
        if let Some(token) = token {
            if let Some(mut record) = self.sessions.get_mut(token) {
                record.last_activity = Utc::now();
                let (is_guest, user_id) = match &record.owner {
                    SessionOwner::Guest => (true, None),
                    SessionOwner::User(id) => (false, Some(id.clone())),
                };
                return SessionIdentity {
                    session_id: token.to_string(),
                    is_guest,
                    user_id,
                };
            }
            tracing::debug!("Unrecognized session token, minting guest session");
        }

        self.create(SessionOwner::Guest)
    }

    /// Create an authenticated session on login
    pub fn login(&self, user_id: impl Into<String>) -> SessionIdentity {
        self.create(SessionOwner::User(user_id.into()))
    }

    /// Delete a session on logout. Returns false for unknown tokens.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    fn create(&self, owner: SessionOwner) -> SessionIdentity {
        let token = mint_token();
        let now = Utc::now();
        let (is_guest, user_id) = match &owner {
            SessionOwner::Guest => (true, None),
            SessionOwner::User(id) => (false, Some(id.clone())),
        };

        self.sessions.insert(
            token.clone(),
            SessionRecord {
                owner,
                created_at: now,
                last_activity: now,
            },
        );

        tracing::info!(session_id = %token, is_guest, "Created new session");
        SessionIdentity {
            session_id: token,
            is_guest,
            user_id,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 32 random bytes from the OS CSPRNG, hex-encoded
fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_mints_guest() {
        let manager = SessionManager::new();

        let identity = manager.resolve(None);
        assert!(identity.is_guest);
        assert!(identity.user_id.is_none());
        assert_eq!(identity.session_id.len(), 64);
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_known_guest_token_is_reused() {
        let manager = SessionManager::new();

        let first = manager.resolve(None);
        let second = manager.resolve(Some(&first.session_id));

        assert_eq!(first.session_id, second.session_id);
        assert!(second.is_guest);
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_unrecognized_token_silently_mints_guest() {
        let manager = SessionManager::new();

        let identity = manager.resolve(Some("garbage-token"));
        assert!(identity.is_guest);
        assert_ne!(identity.session_id, "garbage-token");
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_login_binds_user_id() {
        let manager = SessionManager::new();

        let identity = manager.login("user-42");
        assert!(!identity.is_guest);
        assert_eq!(identity.user_id.as_deref(), Some("user-42"));

        let resolved = manager.resolve(Some(&identity.session_id));
        assert!(!resolved.is_guest);
        assert_eq!(resolved.user_id.as_deref(), Some("user-42"));
    }

    #[test]
    fn test_logout_deletes_session() {
        let manager = SessionManager::new();

        let identity = manager.login("user-42");
        assert!(manager.logout(&identity.session_id));
        assert!(!manager.logout(&identity.session_id));

        // A deleted token now resolves to a fresh guest
        let resolved = manager.resolve(Some(&identity.session_id));
        assert!(resolved.is_guest);
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = SessionManager::new();
        let a = manager.resolve(None);
        let b = manager.resolve(None);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(manager.active_count(), 2);
    }
}
