//! Per-request context

use crate::auth::UserStore;
use crate::Result;
use vax_forecast::RecordFilter;

/// Who is asking and what they selected
///
/// Passed explicitly to every dashboard operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    username: Option<String>,
    filter: RecordFilter,
}

impl Session {
    /// Session with no signed-in user and no filter
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticate against a user store and start a session
    pub fn login(users: &UserStore, username: &str, password: &str) -> Result<Self> {
        users.authenticate(username, password)?;
        Ok(Self {
            username: Some(username.trim().to_string()),
            filter: RecordFilter::all(),
        })
    }

    /// Replace the record filter
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }
}
