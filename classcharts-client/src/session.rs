//! Per-client authentication state

use crate::cookies::{cookie_pairs, parse_cookies};
use crate::error::ClassChartsError;
use reqwest::StatusCode;
use reqwest::header::SET_COOKIE;
use serde::Deserialize;
use std::fmt;
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

/// Head start given to revalidation so a request never races the expiry
pub(crate) const PING_GRACE: Duration = Duration::from_secs(5);

/// Authenticated context held by one client instance
///
/// An empty `session_id` means the client is logged out.
#[derive(Default)]
pub(crate) struct Session {
    pub session_id: Zeroizing<String>,
    /// `name=value` pairs replayed in the `Cookie` header (student logins only)
    pub auth_cookies: Vec<Zeroizing<String>>,
    pub last_ping: Option<Instant>,
    /// Student whose data is requested; for parents, the selected pupil
    pub student_id: Option<i64>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        !self.session_id.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether the session id has to be refreshed before the next request
    ///
    /// Sessions that were never pinged are not revalidated.
    pub fn needs_refresh(&self, interval: Duration, now: Instant) -> bool {
        match self.last_ping {
            Some(pinged_at) => now.saturating_duration_since(pinged_at) + PING_GRACE > interval,
            None => false,
        }
    }

    pub fn record_ping(&mut self, session_id: String, at: Instant) {
        self.session_id = Zeroizing::new(session_id);
        self.last_ping = Some(at);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.is_active())
            .field("auth_cookies", &self.auth_cookies.len())
            .field("last_ping", &self.last_ping)
            .field("student_id", &self.student_id)
            .finish()
    }
}

#[derive(Deserialize)]
struct SessionCredentials {
    session_id: String,
}

/// Credentials returned by a successful login redirect
pub(crate) struct LoginGrant {
    pub session_id: String,
    pub cookies: Vec<String>,
}

/// Read the session id out of a login response
///
/// ClassCharts answers a good login with a 302 whose `Set-Cookie` headers
/// include `cookie_name`, a percent-encoded JSON object holding `session_id`.
pub(crate) fn read_login_grant(
    response: &reqwest::blocking::Response,
    cookie_name: &str,
) -> Result<LoginGrant, ClassChartsError> {
    let headers: Vec<&str> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if response.status() != StatusCode::FOUND || headers.is_empty() {
        return Err(ClassChartsError::authentication(
            "Unauthenticated: ClassCharts didn't return authentication cookies",
        ));
    }

    let mut cookies = parse_cookies(headers.iter().copied());
    let credentials = cookies
        .remove(cookie_name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ClassChartsError::authentication("Failed to extract session credentials"))?;

    let credentials: SessionCredentials = serde_json::from_str(&credentials)
        .map_err(|_| ClassChartsError::authentication("Failed to parse session credentials"))?;

    Ok(LoginGrant {
        session_id: credentials.session_id,
        cookies: cookie_pairs(headers),
    })
}
