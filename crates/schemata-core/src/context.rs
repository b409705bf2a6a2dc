//! Per-call request context threaded through conversion, export and joins.

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// Who is asking, and on behalf of which request.
///
/// Collaborators (managers, tag vocabularies) use it for permission decisions. The schema
/// engine itself only passes it along and uses the request id in log spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub request_id: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RequestContext {
    /// Anonymous context with a fresh request id.
    pub fn anonymous() -> Self {
        Self {
            request_id: generate_id(),
            user: None,
            permissions: Vec::new(),
        }
    }

    /// Context acting for a named user.
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::anonymous()
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
