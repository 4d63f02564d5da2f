//! Server-side session table.
//!
//! # Purpose
//! Binds opaque cookie tokens to the username that logged in, with an issue
//! and expiry time. Nothing else about the user is kept.
//!
//! # Key invariants
//! - Tokens are 256 random bits, hex encoded.
//! - The table is keyed by the SHA-256 of the token, so a dump of the table
//!   cannot be replayed as cookies.
//! - An expired session is removed the first time it is looked up.
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent session table shared by every request.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or(Duration::hours(8)),
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Start a session for `username` and return the cookie token.
    pub fn issue(&self, username: &str) -> String {
        self.issue_at(username, Utc::now())
    }

    fn issue_at(&self, username: &str, now: DateTime<Utc>) -> String {
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            Session {
                username: username.to_string(),
                issued_at: now,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Look up a live session for `token`.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now())
    }

    fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let key = hash_token(token);
        let session = self.sessions.get(&key)?.clone();
        if session.is_expired(now) {
            self.sessions.remove(&key);
            return None;
        }
        Some(session)
    }

    /// Drop the session for `token`. Returns whether one existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    /// Remove every expired session and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let live = !session.is_expired(now);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(std::time::Duration::from_secs(60))
    }

    #[test]
    fn issued_token_resolves_to_user() {
        let sessions = store();
        let token = sessions.issue("analyst");
        assert_eq!(token.len(), 64);
        let session = sessions.resolve(&token).expect("session");
        assert_eq!(session.username, "analyst");
        assert!(session.expires_at > session.issued_at);
    }

    #[test]
    fn tokens_are_unique_and_stored_hashed() {
        let sessions = store();
        let a = sessions.issue("analyst");
        let b = sessions.issue("analyst");
        assert_ne!(a, b);
        assert!(!sessions.sessions.contains_key(&a));
        assert!(sessions.sessions.contains_key(&hash_token(&a)));
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let sessions = store();
        assert!(sessions.resolve("deadbeef").is_none());
    }

    #[test]
    fn expired_session_is_removed_on_lookup() {
        let sessions = store();
        let issued = Utc::now() - Duration::seconds(120);
        let token = sessions.issue_at("analyst", issued);
        assert!(sessions.resolve(&token).is_none());
        assert!(sessions.is_empty());
    }

    #[test]
    fn revoke_ends_the_session() {
        let sessions = store();
        let token = sessions.issue("analyst");
        assert!(sessions.revoke(&token));
        assert!(!sessions.revoke(&token));
        assert!(sessions.resolve(&token).is_none());
    }

    #[test]
    fn purge_drops_only_expired_sessions() {
        let sessions = store();
        sessions.issue_at("old", Utc::now() - Duration::seconds(120));
        let live = sessions.issue("new");
        assert_eq!(sessions.purge_expired(), 1);
        assert_eq!(sessions.len(), 1);
        assert!(sessions.resolve(&live).is_some());
    }

    #[test]
    fn purge_counts_only_its_own_removals_while_logins_continue() {
        let sessions = store();
        let stale = Utc::now() - Duration::seconds(120);
        for _ in 0..200 {
            sessions.issue_at("old", stale);
        }

        let purged = std::thread::scope(|scope| {
            let issuer = scope.spawn(|| {
                for _ in 0..2_000 {
                    sessions.issue("new");
                }
            });
            let mut purged = 0;
            while !issuer.is_finished() {
                purged += sessions.purge_expired();
            }
            issuer.join().expect("issuer thread");
            purged + sessions.purge_expired()
        });

        assert_eq!(purged, 200);
        assert_eq!(sessions.len(), 2_000);
    }
}
