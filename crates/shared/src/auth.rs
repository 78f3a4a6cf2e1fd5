//! Authentication claims attached to each request.
//!
//! Token issuance lives in the identity service; this crate only carries
//! the claim shape and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User's role (member, accounting, manager, admin).
    pub role: String,
    /// Granted permission names.
    pub permissions: Vec<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        role: &str,
        permissions: Vec<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_string(),
            permissions,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Whether the caller holds the given permission.
    #[must_use]
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_permission_check() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "accounting",
            vec!["savings:approve".to_string(), "loans:view".to_string()],
            Utc::now() + Duration::minutes(15),
        );

        assert!(claims.can("savings:approve"));
        assert!(!claims.can("loans:approve-manager"));
    }
}
