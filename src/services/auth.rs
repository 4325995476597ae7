//! Auth service for admin login and JWT lifecycle.
//!
//! Handles:
//! - Password hashing and verification (Argon2 PHC strings)
//! - Access token issue, verification, refresh and revocation (HS256 JWTs)
//! - Creating the bootstrap admin account at startup

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::db::{self, CreateUser, DbPool, User, UserRole};
use crate::error::{Error, Result};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    /// Token id, used for revocation
    pub jti: String,
}

/// Body returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub user: User,
}

/// Service for authentication and token management.
#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: DbPool, config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            db,
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Create the configured bootstrap admin if no user has that email yet.
    pub async fn ensure_bootstrap_admin(&self) -> Result<Option<User>> {
        let Some(admin) = self.config.bootstrap_admin.clone() else {
            return Ok(None);
        };

        if db::get_user_by_email(&self.db, &admin.email).await?.is_some() {
            return Ok(None);
        }

        if admin.password.chars().count() < MIN_PASSWORD_LEN {
            warn!(
                "ADMIN_PASSWORD is shorter than {} characters, bootstrap admin not created",
                MIN_PASSWORD_LEN
            );
            return Ok(None);
        }

        let user = db::create_user(
            &self.db,
            CreateUser {
                name: admin.name,
                email: admin.email,
                password_hash: hash_password(&admin.password)?,
                role: UserRole::Admin,
            },
        )
        .await?;

        info!(user_id = %user.id, "Bootstrap admin created");
        Ok(Some(user))
    }

    /// Exchange email and password for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let user = db::get_user_by_email(&self.db, email)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(Error::InvalidCredentials);
        }

        db::touch_last_login(&self.db, &user.id).await?;
        let user = db::get_user(&self.db, &user.id).await?;

        info!(user_id = %user.id, "User logged in");
        self.token_response(user)
    }

    /// Verify an access token: signature, expiry, and revocation.
    pub async fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.decode(token, true)?;

        if db::is_token_revoked(&self.db, &claims.jti).await? {
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }

    /// Revoke the token described by `claims`.
    pub async fn logout(&self, claims: &Claims) -> Result<()> {
        if !self.revoke(claims).await? {
            return Err(Error::InvalidToken);
        }
        info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    /// Swap a token for a fresh one. The presented token may be expired as
    /// long as it was issued within the refresh window.
    pub async fn refresh(&self, token: &str) -> Result<TokenResponse> {
        let claims = self.decode(token, false)?;

        if Utc::now().timestamp() >= self.refresh_deadline(&claims) {
            return Err(Error::TokenExpired);
        }

        // Single use: a concurrent refresh of the same token loses this insert
        if !self.revoke(&claims).await? {
            return Err(Error::InvalidToken);
        }

        let user = db::get_user(&self.db, &claims.sub)
            .await
            .map_err(|_| Error::InvalidToken)?;

        self.token_response(user)
    }

    /// Change a user's password after checking the current one.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = db::get_user(&self.db, user_id).await?;

        if !verify_password(current_password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }

        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::field(
                "new_password",
                format!(
                    "The new password must be at least {} characters.",
                    MIN_PASSWORD_LEN
                ),
            ));
        }

        db::update_password_hash(&self.db, user_id, &hash_password(new_password)?).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Issue a signed token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<(String, Claims)> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.token_ttl_minutes)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = self.encode(&claims)?;
        Ok((token, claims))
    }

    fn token_response(&self, user: User) -> Result<TokenResponse> {
        let (access_token, claims) = self.issue_token(&user)?;
        Ok(TokenResponse {
            access_token,
            token_type: "bearer",
            expires_in: claims.exp - claims.iat,
            user,
        })
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    fn decode(&self, token: &str, validate_exp: bool) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = validate_exp;
        validation.leeway = 0;
        if !validate_exp {
            validation.required_spec_claims.remove("exp");
        }

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::InvalidToken,
            })
    }

    /// Last instant (unix seconds) the token may be refreshed.
    fn refresh_deadline(&self, claims: &Claims) -> i64 {
        claims.iat + self.config.refresh_ttl_minutes * 60
    }

    /// Revocations must outlive both expiry and the refresh window, or a
    /// logged-out token could be refreshed once its row is purged.
    async fn revoke(&self, claims: &Claims) -> Result<bool> {
        let until = claims.exp.max(self.refresh_deadline(claims));
        let until = DateTime::<Utc>::from_timestamp(until, 0)
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(chrono::SecondsFormat::Micros, true);
        db::revoke_token(&self.db, &claims.jti, &until).await
    }
}

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::Internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
