//! API key domain model
//!
//! Keys are bearer credentials scoped to a user. The plaintext token is
//! returned to the caller exactly once, at creation; only its SHA-256 hash
//! is ever persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read/write/delete permission triple carried by every key.
///
/// A key created without explicit permissions gets all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyPermissions {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl Default for ApiKeyPermissions {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
        }
    }
}

/// API key as surfaced to its owner. The stored hash never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiKey {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Display prefix, e.g. `blink_m9x2k1_a1b2c3d4...`
    pub prefix: String,
    pub permissions: ApiKeyPermissions,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of key creation. `token` is the one and only copy of the
/// plaintext credential.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedApiKey {
    pub token: String,
    pub api_key: ApiKey,
}

/// Input for [`crate::application::ApiKeyService::create_api_key`].
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateApiKey {
    pub name: String,
    pub permissions: Option<ApiKeyPermissions>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Ownership-scoped partial update. Only name, permissions and expiry are
/// mutable after creation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateApiKey {
    pub name: Option<String>,
    pub permissions: Option<ApiKeyPermissions>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of a successful token verification.
#[derive(Debug, Clone)]
pub struct VerifiedApiKey {
    pub key_id: String,
    pub user_id: String,
    pub permissions: ApiKeyPermissions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_permissions_grant_everything() {
        let perms = ApiKeyPermissions::default();
        assert!(perms.read && perms.write && perms.delete);
    }

    #[test]
    fn permissions_roundtrip_json() {
        let perms = ApiKeyPermissions {
            read: true,
            write: false,
            delete: false,
        };
        let json = serde_json::to_string(&perms).unwrap();
        let back: ApiKeyPermissions = serde_json::from_str(&json).unwrap();
        assert_eq!(perms, back);
    }
}
