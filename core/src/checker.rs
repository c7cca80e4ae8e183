//! Per-account API-client handles.
//!
//! A [`Checker`] bundles the HTTP client a worker uses to impersonate one
//! account together with the debug headers that identify that account to the
//! target service's request logs. One handle is created per account on first
//! checkout and cached for the account's lifetime, so session and connection
//! state survive across checkout cycles. Handles are never shared between
//! accounts.
//!
//! The state core only constructs and caches these handles; all actual I/O
//! is performed by the scenario workers.

use std::collections::HashMap;

/// Debug header stamped on requests issued on behalf of a regular account.
pub const USER_LOGIN_HEADER: &str = "X-User-Login-Name";

/// Debug header stamped on requests issued on behalf of an administrator.
pub const ADMIN_LOGIN_HEADER: &str = "X-Admin-Login-Name";

/// Reusable per-account API-client handle.
#[derive(Debug, Clone)]
pub struct Checker {
    client: reqwest::Client,
    debug_headers: HashMap<&'static str, String>,
}

impl Checker {
    /// Creates a handle stamped with the user login header.
    #[must_use]
    pub fn for_user(login_name: &str) -> Self {
        Self::with_debug_header(USER_LOGIN_HEADER, login_name)
    }

    /// Creates a handle stamped with the administrator login header.
    #[must_use]
    pub fn for_administrator(login_name: &str) -> Self {
        Self::with_debug_header(ADMIN_LOGIN_HEADER, login_name)
    }

    fn with_debug_header(name: &'static str, value: &str) -> Self {
        let mut debug_headers = HashMap::new();
        debug_headers.insert(name, value.to_string());
        Self {
            client: reqwest::Client::new(),
            debug_headers,
        }
    }

    /// The underlying HTTP client for this account.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The debug headers identifying this account.
    #[must_use]
    pub const fn debug_headers(&self) -> &HashMap<&'static str, String> {
        &self.debug_headers
    }

    /// Attaches this account's debug headers to an outgoing request.
    #[must_use]
    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.debug_headers
            .iter()
            .fold(request, |request, (name, value)| {
                request.header(*name, value)
            })
    }
}
