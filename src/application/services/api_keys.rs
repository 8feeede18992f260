//! API key service
//!
//! Generates, lists, updates, deletes, verifies and toggles bearer keys.
//! Every operation takes the owning user id and scopes its queries by it;
//! the plaintext token leaves this module exactly once, at creation.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::auth::token::{generate_token, hash_token};
use crate::domain::{
    ApiKey, ApiKeyPermissions, CreateApiKey, DomainError, DomainResult, GeneratedApiKey,
    UpdateApiKey, VerifiedApiKey,
};
use crate::infrastructure::database::entities::api_key;

#[derive(Clone)]
pub struct ApiKeyService {
    db: DatabaseConnection,
}

fn key_not_found(key_id: &str) -> DomainError {
    DomainError::NotFound {
        entity: "api_key",
        field: "id",
        value: key_id.to_string(),
    }
}

fn model_to_view(model: api_key::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        prefix: model.prefix,
        permissions: ApiKeyPermissions {
            read: model.can_read,
            write: model.can_write,
            delete: model.can_delete,
        },
        is_active: model.is_active,
        expires_at: model.expires_at,
        last_used_at: model.last_used_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl ApiKeyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a key for a user. Returns the plaintext token exactly once;
    /// only its hash is persisted.
    pub async fn create_api_key(
        &self,
        user_id: &str,
        request: CreateApiKey,
    ) -> DomainResult<GeneratedApiKey> {
        if request.name.trim().is_empty() {
            return Err(DomainError::Validation("key name must not be empty".into()));
        }

        let permissions = request.permissions.unwrap_or_default();
        let generated = generate_token();
        let now = Utc::now();

        let row = api_key::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            name: Set(request.name),
            key_hash: Set(generated.token_hash),
            prefix: Set(generated.prefix),
            can_read: Set(permissions.read),
            can_write: Set(permissions.write),
            can_delete: Set(permissions.delete),
            is_active: Set(true),
            expires_at: Set(request.expires_at),
            last_used_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = row.insert(&self.db).await?;
        metrics::counter!("blink_api_keys_created_total").increment(1);

        Ok(GeneratedApiKey {
            token: generated.token,
            api_key: model_to_view(model),
        })
    }

    /// All keys for a user, newest first. Hashes stay behind.
    pub async fn get_user_api_keys(&self, user_id: &str) -> DomainResult<Vec<ApiKey>> {
        let keys = api_key::Entity::find()
            .filter(api_key::Column::UserId.eq(user_id))
            .order_by_desc(api_key::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(keys.into_iter().map(model_to_view).collect())
    }

    /// Ownership-scoped partial update. Only name, permissions and expiry
    /// are mutable.
    pub async fn update_api_key(
        &self,
        key_id: &str,
        user_id: &str,
        updates: UpdateApiKey,
    ) -> DomainResult<ApiKey> {
        let key = api_key::Entity::find()
            .filter(api_key::Column::Id.eq(key_id))
            .filter(api_key::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| key_not_found(key_id))?;

        let mut active: api_key::ActiveModel = key.into();
        if let Some(name) = updates.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("key name must not be empty".into()));
            }
            active.name = Set(name);
        }
        if let Some(permissions) = updates.permissions {
            active.can_read = Set(permissions.read);
            active.can_write = Set(permissions.write);
            active.can_delete = Set(permissions.delete);
        }
        if let Some(expires_at) = updates.expires_at {
            active.expires_at = Set(Some(expires_at));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(model_to_view(model))
    }

    /// Ownership-scoped hard delete.
    pub async fn delete_api_key(&self, key_id: &str, user_id: &str) -> DomainResult<()> {
        let result = api_key::Entity::delete_many()
            .filter(api_key::Column::Id.eq(key_id))
            .filter(api_key::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(key_not_found(key_id));
        }
        Ok(())
    }

    /// Verify a plaintext token. A key that is missing or inactive is
    /// invalid; a matched key past its expiry is expired even while still
    /// flagged active. On success the last-used timestamp is touched with a
    /// single UPDATE statement.
    pub async fn verify_api_key(&self, token: &str) -> DomainResult<VerifiedApiKey> {
        let token_hash = hash_token(token);

        let key = api_key::Entity::find()
            .filter(api_key::Column::KeyHash.eq(&token_hash))
            .filter(api_key::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(DomainError::InvalidApiKey)?;

        if let Some(expires_at) = key.expires_at {
            if Utc::now() > expires_at {
                metrics::counter!("blink_api_key_verifications_total", "outcome" => "expired")
                    .increment(1);
                return Err(DomainError::ApiKeyExpired);
            }
        }

        api_key::Entity::update_many()
            .col_expr(api_key::Column::LastUsedAt, Expr::value(Utc::now()))
            .filter(api_key::Column::Id.eq(&key.id))
            .exec(&self.db)
            .await?;

        metrics::counter!("blink_api_key_verifications_total", "outcome" => "ok").increment(1);

        Ok(VerifiedApiKey {
            key_id: key.id,
            user_id: key.user_id,
            permissions: ApiKeyPermissions {
                read: key.can_read,
                write: key.can_write,
                delete: key.can_delete,
            },
        })
    }

    /// Flip the active flag with SQL-side negation, so two racing toggles
    /// cannot both read the same starting state. Returns the new state.
    pub async fn toggle_api_key_status(&self, key_id: &str, user_id: &str) -> DomainResult<bool> {
        let result = api_key::Entity::update_many()
            .col_expr(
                api_key::Column::IsActive,
                Expr::col(api_key::Column::IsActive).not(),
            )
            .col_expr(api_key::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(api_key::Column::Id.eq(key_id))
            .filter(api_key::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(key_not_found(key_id));
        }

        let key = api_key::Entity::find_by_id(key_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| key_not_found(key_id))?;
        Ok(key.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{seed_user, setup_db};
    use chrono::Duration;

    async fn service() -> (ApiKeyService, DatabaseConnection) {
        let db = setup_db().await;
        seed_user(&db, "u1").await;
        (ApiKeyService::new(db.clone()), db)
    }

    fn create_request(name: &str) -> CreateApiKey {
        CreateApiKey {
            name: name.to_string(),
            permissions: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_full_permissions() {
        let (svc, _db) = service().await;
        let generated = svc
            .create_api_key("u1", create_request("ci key"))
            .await
            .unwrap();

        let perms = generated.api_key.permissions;
        assert!(perms.read && perms.write && perms.delete);
        assert!(generated.api_key.is_active);
    }

    #[tokio::test]
    async fn plaintext_token_is_never_persisted() {
        let (svc, db) = service().await;
        let generated = svc
            .create_api_key("u1", create_request("ci key"))
            .await
            .unwrap();

        let row = api_key::Entity::find_by_id(&generated.api_key.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(row.key_hash, hash_token(&generated.token));
        assert_ne!(row.key_hash, generated.token);
        // the display prefix is truncated, not the full credential
        assert!(!row.prefix.contains(&generated.token));
    }

    #[tokio::test]
    async fn verify_returns_owner_and_touches_last_used() {
        let (svc, db) = service().await;
        let generated = svc
            .create_api_key(
                "u1",
                CreateApiKey {
                    name: "ro key".to_string(),
                    permissions: Some(ApiKeyPermissions {
                        read: true,
                        write: false,
                        delete: false,
                    }),
                    expires_at: None,
                },
            )
            .await
            .unwrap();

        let verified = svc.verify_api_key(&generated.token).await.unwrap();
        assert_eq!(verified.user_id, "u1");
        assert_eq!(verified.key_id, generated.api_key.id);
        assert!(verified.permissions.read);
        assert!(!verified.permissions.write);

        let row = api_key::Entity::find_by_id(&generated.api_key.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(row.last_used_at.is_some());
    }

    #[tokio::test]
    async fn verify_rejects_unknown_token() {
        let (svc, _db) = service().await;
        let err = svc
            .verify_api_key("blink_zzzz_0123456789abcdef0123456789abcdef")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidApiKey));
    }

    #[tokio::test]
    async fn verify_rejects_inactive_key() {
        let (svc, _db) = service().await;
        let generated = svc
            .create_api_key("u1", create_request("soon disabled"))
            .await
            .unwrap();

        svc.toggle_api_key_status(&generated.api_key.id, "u1")
            .await
            .unwrap();

        let err = svc.verify_api_key(&generated.token).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidApiKey));
    }

    #[tokio::test]
    async fn verify_rejects_expired_key_distinctly() {
        let (svc, _db) = service().await;
        let generated = svc
            .create_api_key(
                "u1",
                CreateApiKey {
                    name: "stale".to_string(),
                    permissions: None,
                    expires_at: Some(Utc::now() - Duration::hours(1)),
                },
            )
            .await
            .unwrap();

        let err = svc.verify_api_key(&generated.token).await.unwrap_err();
        assert!(matches!(err, DomainError::ApiKeyExpired));
    }

    #[tokio::test]
    async fn toggle_flips_back_and_forth() {
        let (svc, _db) = service().await;
        let generated = svc
            .create_api_key("u1", create_request("toggled"))
            .await
            .unwrap();
        let id = &generated.api_key.id;

        assert!(!svc.toggle_api_key_status(id, "u1").await.unwrap());
        assert!(svc.toggle_api_key_status(id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn update_is_scoped_to_owner() {
        let (svc, db) = service().await;
        seed_user(&db, "u2").await;
        let generated = svc
            .create_api_key("u1", create_request("mine"))
            .await
            .unwrap();

        let err = svc
            .update_api_key(
                &generated.api_key.id,
                "u2",
                UpdateApiKey {
                    name: Some("stolen".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let updated = svc
            .update_api_key(
                &generated.api_key.id,
                "u1",
                UpdateApiKey {
                    name: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let (svc, _db) = service().await;
        let generated = svc
            .create_api_key("u1", create_request("short lived"))
            .await
            .unwrap();

        svc.delete_api_key(&generated.api_key.id, "u1").await.unwrap();

        assert!(svc.get_user_api_keys("u1").await.unwrap().is_empty());
        let err = svc
            .delete_api_key(&generated.api_key.id, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let (svc, _db) = service().await;
        svc.create_api_key("u1", create_request("first"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        svc.create_api_key("u1", create_request("second"))
            .await
            .unwrap();

        let keys = svc.get_user_api_keys("u1").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].name, "second");
        assert_eq!(keys[1].name, "first");
    }
}
