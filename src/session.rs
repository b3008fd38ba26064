//! Per-request session handling.
//!
//! Each request carries a [`SessionContext`]: empty until a login signs an
//! account in, cleared again on logout. The [`SessionRegistry`] maps the
//! opaque token in the session cookie to the context it belongs to, and
//! forgets sessions older than its configured maximum age.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::identity::AccountId;

/// Cookie name used when the configuration does not set one.
pub const DEFAULT_COOKIE_NAME: &str = "payroll_session";

/// Session lifetime used when the configuration does not set one.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(8 * 60 * 60);

/// The signed-in state of one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<AccountId>,
}

impl SessionContext {
    /// A context with nobody signed in.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Marks `account` as signed in.
    pub fn sign_in(&mut self, account: AccountId) {
        self.user = Some(account);
    }

    /// Clears the signed-in account.
    pub fn sign_out(&mut self) {
        self.user = None;
    }

    /// The signed-in account, if any.
    pub fn user(&self) -> Option<AccountId> {
        self.user
    }

    /// Returns true when an account is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns the signed-in account or [`PayrollError::Unauthenticated`].
    pub fn require_user(&self) -> PayrollResult<AccountId> {
        self.user.ok_or(PayrollError::Unauthenticated)
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveSession {
    context: SessionContext,
    issued_at: Instant,
}

/// Live sessions keyed by the token stored in the session cookie.
#[derive(Debug)]
pub struct SessionRegistry {
    cookie_name: String,
    max_age: Duration,
    sessions: RwLock<HashMap<Uuid, LiveSession>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE)
    }
}

impl SessionRegistry {
    /// Creates an empty registry that reads and writes `cookie_name`.
    ///
    /// A session stops resolving once `max_age` has passed since it was
    /// started.
    pub fn new(cookie_name: impl Into<String>, max_age: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            max_age,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// How long a session stays valid after it is started.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Number of sessions that have not yet expired.
    pub fn live_sessions(&self) -> PayrollResult<usize> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        self.purge_expired(&mut sessions);
        Ok(sessions.len())
    }

    /// Starts a session with `account` signed in and returns its token.
    pub fn start(&self, account: AccountId) -> PayrollResult<Uuid> {
        let token = Uuid::new_v4();
        let mut context = SessionContext::empty();
        context.sign_in(account);

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        self.purge_expired(&mut sessions);
        sessions.insert(
            token,
            LiveSession {
                context,
                issued_at: Instant::now(),
            },
        );
        Ok(token)
    }

    /// Resolves the session for a request.
    ///
    /// A missing, malformed, unknown or expired cookie yields an empty
    /// context.
    pub fn resolve(&self, jar: &CookieJar) -> PayrollResult<SessionContext> {
        let Some(token) = self.token_from(jar) else {
            return Ok(SessionContext::empty());
        };

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        self.purge_expired(&mut sessions);
        Ok(sessions
            .get(&token)
            .map(|session| session.context)
            .unwrap_or_default())
    }

    /// Ends the session named by the request's cookie.
    ///
    /// Returns whether a live session was removed.
    pub fn end(&self, jar: &CookieJar) -> PayrollResult<bool> {
        let Some(token) = self.token_from(jar) else {
            return Ok(false);
        };

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        self.purge_expired(&mut sessions);
        Ok(match sessions.remove(&token) {
            Some(mut session) => {
                session.context.sign_out();
                true
            }
            None => false,
        })
    }

    /// The cookie that hands `token` to the client.
    pub fn session_cookie(&self, token: Uuid) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// The cookie to pass to [`CookieJar::remove`] to clear the session.
    ///
    /// Its path matches [`Self::session_cookie`] so browsers drop the same
    /// cookie.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }

    fn token_from(&self, jar: &CookieJar) -> Option<Uuid> {
        jar.get(&self.cookie_name)
            .and_then(|cookie| Uuid::parse_str(cookie.value().trim()).ok())
    }

    fn purge_expired(&self, sessions: &mut HashMap<Uuid, LiveSession>) {
        let before = sessions.len();
        sessions.retain(|_, session| session.issued_at.elapsed() < self.max_age);

        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, "Dropped expired sessions");
        }
    }
}

fn poisoned() -> PayrollError {
    PayrollError::IdentityFailure {
        message: "session registry lock poisoned".to_string(),
    }
}
