//! Server-side sessions keyed by a client-held identifier.
//!
//! The client only ever holds an opaque session id, carried in a cookie and
//! signed with the session secret (format: `<id>.<hex hmac-sha256 tag>`).
//! The access token issued at login lives in this in-process map, never in
//! the cookie itself.
//!
//! Entries use a sliding expiry matching the token lifetime: every read
//! refreshes the deadline, and a background task sweeps out entries that
//! have gone quiet.

use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "homefront_session";

#[derive(Debug)]
struct SessionEntry {
    /// Access token issued at the last successful login.
    token: String,
    /// Sliding deadline; refreshed on every read.
    deadline: Instant,
}

/// Thread-safe session map with sliding TTL.
#[derive(Debug)]
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Generate a fresh, unguessable session id.
    pub fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Bind a token to the given session id, creating the entry or replacing
    /// whatever token it held before.
    pub fn attach(&self, id: &str, token: String) {
        self.entries.insert(
            id.to_string(),
            SessionEntry {
                token,
                deadline: Instant::now() + self.ttl,
            },
        );
    }

    /// Fetch the token bound to a session, refreshing its deadline.
    /// Returns None for unknown or expired sessions.
    pub fn token(&self, id: &str) -> Option<String> {
        let now = Instant::now();
        let mut entry = self.entries.get_mut(id)?;
        if entry.deadline <= now {
            drop(entry);
            self.entries.remove(id);
            return None;
        }
        entry.deadline = now + self.ttl;
        Some(entry.token.clone())
    }

    /// Drop a session outright. Returns whether an entry existed.
    pub fn clear(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Remove expired entries to prevent unbounded growth.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.deadline > now);
    }

    /// Number of live entries (for monitoring)
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// Spawn a background task that periodically sweeps expired sessions.
pub fn spawn_cleanup_task(store: Arc<SessionStore>, cleanup_interval_secs: u64) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(cleanup_interval_secs);
        loop {
            tokio::time::sleep(interval).await;
            store.cleanup_expired();
            tracing::debug!(
                "Session cleanup complete, {} entries remaining",
                store.entry_count()
            );
        }
    });
}

/// Produce the cookie value for a session id: `<id>.<hex tag>`.
pub fn sign_cookie(id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    let tag = hex::encode(mac.finalize().into_bytes());
    format!("{}.{}", id, tag)
}

/// Recover the session id from a cookie value, rejecting anything whose tag
/// does not verify. Comparison is constant-time.
pub fn verify_cookie(value: &str, secret: &str) -> Option<String> {
    let (id, tag_hex) = value.split_once('.')?;
    let presented = hex::decode(tag_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    let expected = mac.finalize().into_bytes();

    if presented.len() == expected.len() && presented.ct_eq(expected.as_slice()).into() {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret";

    #[test]
    fn test_attach_and_read() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.generate_id();
        store.attach(&id, "token-a".to_string());
        assert_eq!(store.token(&id), Some("token-a".to_string()));
    }

    #[test]
    fn test_attach_replaces_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.generate_id();
        store.attach(&id, "token-a".to_string());
        store.attach(&id, "token-b".to_string());
        assert_eq!(store.token(&id), Some("token-b".to_string()));
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert_eq!(store.token("missing"), None);
    }

    #[test]
    fn test_expired_session_evicted_on_read() {
        let store = SessionStore::new(Duration::from_secs(0));
        let id = store.generate_id();
        store.attach(&id, "token-a".to_string());
        assert_eq!(store.token(&id), None);
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.generate_id();
        store.attach(&id, "token-a".to_string());
        assert!(store.clear(&id));
        assert!(!store.clear(&id));
        assert_eq!(store.token(&id), None);
    }

    #[test]
    fn test_cleanup_retains_live_entries() {
        let live = SessionStore::new(Duration::from_secs(60));
        let id = live.generate_id();
        live.attach(&id, "token-a".to_string());
        live.cleanup_expired();
        assert_eq!(live.entry_count(), 1);

        let dead = SessionStore::new(Duration::from_secs(0));
        dead.attach("stale", "token-b".to_string());
        dead.cleanup_expired();
        assert_eq!(dead.entry_count(), 0);
    }

    #[test]
    fn test_cookie_roundtrip() {
        let cookie = sign_cookie("session-1", SECRET);
        assert_eq!(verify_cookie(&cookie, SECRET), Some("session-1".to_string()));
    }

    #[test]
    fn test_cookie_tampered_id_rejected() {
        let cookie = sign_cookie("session-1", SECRET);
        let tag = cookie.split_once('.').unwrap().1;
        let forged = format!("session-2.{}", tag);
        assert_eq!(verify_cookie(&forged, SECRET), None);
    }

    #[test]
    fn test_cookie_tampered_tag_rejected() {
        let cookie = sign_cookie("session-1", SECRET);
        let (id, tag) = cookie.split_once('.').unwrap();
        let mut flipped: String = tag.to_string();
        let last = flipped.pop().unwrap();
        flipped.push(if last == '0' { '1' } else { '0' });
        assert_eq!(verify_cookie(&format!("{}.{}", id, flipped), SECRET), None);
    }

    #[test]
    fn test_cookie_wrong_secret_rejected() {
        let cookie = sign_cookie("session-1", SECRET);
        assert_eq!(verify_cookie(&cookie, "other-secret"), None);
    }

    #[test]
    fn test_cookie_malformed_rejected() {
        assert_eq!(verify_cookie("no-separator", SECRET), None);
        assert_eq!(verify_cookie("id.not-hex!", SECRET), None);
        assert_eq!(verify_cookie("", SECRET), None);
    }
}
