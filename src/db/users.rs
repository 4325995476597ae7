//! Admin user and token revocation queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::{Error, Result};

// ============================================================================
// User Types
// ============================================================================

/// User role enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Admin,
    Editor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "editor" => Self::Editor,
            _ => Self::Admin,
        }
    }
}

/// User record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn role_enum(&self) -> UserRole {
        UserRole::from_str(&self.role)
    }
}

/// Input for creating a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

// ============================================================================
// User Queries
// ============================================================================

pub async fn create_user(pool: &DbPool, input: CreateUser) -> Result<User> {
    let now = super::timestamp();
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(super::new_id())
    .bind(&input.name)
    .bind(input.email.to_lowercase())
    .bind(&input.password_hash)
    .bind(input.role.as_str())
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(format!("User with email {}", input.email))
        }
        _ => Error::Database(e),
    })
}

pub async fn get_user(pool: &DbPool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {}", id)))
}

/// Emails are stored lowercased, so lookups are case-insensitive.
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

pub async fn touch_last_login(pool: &DbPool, id: &str) -> Result<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(super::timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password_hash(pool: &DbPool, id: &str, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(super::timestamp())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User {}", id)));
    }

    Ok(())
}

// ============================================================================
// Token Revocation Queries
// ============================================================================

/// Record a token id as revoked until its natural expiry, and drop
/// revocations that have outlived their tokens.
///
/// Returns `false` when the token was already revoked.
pub async fn revoke_token(pool: &DbPool, jti: &str, expires_at: &str) -> Result<bool> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?, ?)")
            .bind(jti)
            .bind(expires_at)
            .execute(pool)
            .await?;

    sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
        .bind(super::timestamp())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn is_token_revoked(pool: &DbPool, jti: &str) -> Result<bool> {
    let row: Option<(String,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = ?")
        .bind(jti)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(email: &str) -> CreateUser {
        CreateUser {
            name: "Admin".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: UserRole::Admin,
        }
    }

    #[tokio::test]
    async fn test_email_is_unique_and_case_insensitive() {
        let pool = super::super::test_pool().await;
        let user = create_user(&pool, admin("Admin@Example.org")).await.unwrap();
        assert_eq!(user.email, "admin@example.org");

        let found = get_user_by_email(&pool, "ADMIN@example.org").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let dup = create_user(&pool, admin("admin@example.org")).await;
        assert!(matches!(dup, Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: "u1".into(),
            name: "Admin".into(),
            email: "admin@example.org".into(),
            password_hash: "$argon2id$secret".into(),
            role: "admin".into(),
            last_login: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(user.role_enum(), UserRole::Admin);
    }

    #[tokio::test]
    async fn test_revocation_purges_expired_rows() {
        let pool = super::super::test_pool().await;
        revoke_token(&pool, "old", "2000-01-01T00:00:00.000000Z").await.unwrap();
        assert!(!is_token_revoked(&pool, "old").await.unwrap());

        assert!(revoke_token(&pool, "fresh", "2999-01-01T00:00:00.000000Z").await.unwrap());
        assert!(is_token_revoked(&pool, "fresh").await.unwrap());

        // A second revocation of the same id is reported, not repeated
        assert!(!revoke_token(&pool, "fresh", "2999-01-01T00:00:00.000000Z").await.unwrap());
    }
}
