//! Shared types for the ward API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core_state::CoreState;
use crate::models::StaffProfile;

/// Idle lifetime of a full session token.
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// Fixed lifetime of a change-scoped token. Long enough to type a new
/// PIN, short enough not to linger on a shared terminal.
const CHANGE_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus API-specific in-memory state.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<Mutex<SessionRegistry>>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            sessions: Arc::new(Mutex::new(SessionRegistry::new())),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Staff context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated staff identity, injected into request extensions by the
/// auth middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub profile: StaffProfile,
    /// The token behind this request is only good for the
    /// password-change endpoint.
    pub change_scoped: bool,
}

// ═══════════════════════════════════════════════════════════
// Session registry
// ═══════════════════════════════════════════════════════════

struct SessionEntry {
    profile: StaffProfile,
    change_scoped: bool,
    issued_at: Instant,
    last_seen: Instant,
}

/// Active bearer sessions, keyed by the SHA-256 digest of the token.
/// Raw tokens are never stored.
pub struct SessionRegistry {
    sessions: HashMap<[u8; 32], SessionEntry>,
    idle_timeout: Duration,
    change_ttl: Duration,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout: SESSION_IDLE_TIMEOUT,
            change_ttl: CHANGE_TOKEN_TTL,
        }
    }

    /// Issue a token for the given staff identity and return it raw;
    /// only its digest is retained.
    pub fn issue(&mut self, profile: StaffProfile, change_scoped: bool) -> String {
        let token = generate_token();
        let now = Instant::now();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                profile,
                change_scoped,
                issued_at: now,
                last_seen: now,
            },
        );
        token
    }

    /// Look a token up. A hit refreshes the idle clock; an expired entry
    /// is dropped on sight. Change-scoped tokens run on a fixed clock
    /// from issuance instead — they are not prolongable.
    pub fn validate(&mut self, token: &str) -> Option<StaffContext> {
        let digest = hash_token(token);
        let entry = self.sessions.get_mut(&digest)?;

        let now = Instant::now();
        let expired = if entry.change_scoped {
            now.duration_since(entry.issued_at) > self.change_ttl
        } else {
            now.duration_since(entry.last_seen) > self.idle_timeout
        };
        if expired {
            self.sessions.remove(&digest);
            return None;
        }

        entry.last_seen = now;
        Some(StaffContext {
            profile: entry.profile.clone(),
            change_scoped: entry.change_scoped,
        })
    }

    /// Revoke a single token (logout). Returns whether it existed.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&hash_token(token)).is_some()
    }

    /// Drop every session held by an account. Used after a password
    /// change and when an account is taken out of service.
    pub fn revoke_all_for(&mut self, staff_id: &str) {
        self.sessions.retain(|_, entry| entry.profile.id != staff_id);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — per-caller sliding window
// ═══════════════════════════════════════════════════════════

/// Per-caller rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            per_minute: 100,
            per_hour: 1000,
        }
    }

    /// Check if a caller is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, caller: &str) -> Result<(), u64> {
        let now = Instant::now();
        let entries = self.windows.entry(caller.to_string()).or_default();

        // Clean entries older than 1 hour
        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        // Check per-minute
        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        // Check per-hour
        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
