//! Session lifecycle state as observed by the rest of the application.

use serde::{Deserialize, Serialize};

use crate::profile::{self, Identity};

/// Session lifecycle.
///
/// `Uninitialized → Loading → {Authenticated, Anonymous}`; `Loading` is
/// re-entered on every identity-provider callback and sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    #[serde(rename = "user")]
    pub identity: Option<Identity>,
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            identity: None,
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            identity: Some(identity),
            error: None,
        }
    }

    pub fn anonymous(error: Option<String>) -> Self {
        Self {
            status: SessionStatus::Anonymous,
            identity: None,
            error,
        }
    }

    /// A decision cannot be made yet.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Uninitialized | SessionStatus::Loading
        )
    }

    pub fn check_permission(&self, permission: &str) -> bool {
        profile::check_permission(self.identity.as_ref(), permission)
    }

    pub fn can_access_section(&self, key: &str) -> bool {
        profile::can_access_section(self.identity.as_ref(), key)
    }
}
