// src/auth/service.rs

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::jwt::{JwtKeys, TokenKind};
use super::models::{
    AccessTokenResponse, LoginRequest, SignupRequest, SignupResponse, TokenResponse, UserRow,
    WithdrawRequest,
};
use super::password::{hash_password, validate_email, validate_password_strength, verify_password};
use super::AuthError;

const TOKEN_TYPE: &str = "Bearer";

#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    keys: JwtKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(db: SqlitePool, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            db,
            keys,
            bcrypt_cost,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn signup(&self, req: SignupRequest) -> Result<SignupResponse, AuthError> {
        let email = req.email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password_strength(&req.password)?;

        if self.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&req.password, self.bcrypt_cost)?;
        let name = req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let now = chrono::Utc::now().timestamp();

        let user_id = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&name)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        info!(user_id, "User registered");

        Ok(SignupResponse {
            user_id,
            email,
            name,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AuthError> {
        let email = req.email.trim().to_lowercase();
        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access = self.keys.issue(user.id, TokenKind::Access)?;
        let refresh = self.keys.issue(user.id, TokenKind::Refresh)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at, revoked, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(user.id)
        .bind(&refresh.token)
        .bind(refresh.expires_at)
        .bind(now)
        .execute(&self.db)
        .await?;

        info!(user_id = user.id, "User logged in");

        Ok(TokenResponse {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: TOKEN_TYPE.to_string(),
            user_id: user.id,
            email: user.email,
        })
    }

    /// Exchange a stored, unrevoked refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessTokenResponse, AuthError> {
        let claims = self.keys.verify(refresh_token, TokenKind::Refresh)?;
        let user_id = claims.user_id()?;
        let now = chrono::Utc::now().timestamp();

        let row: Option<(i64, i64, bool)> = sqlx::query_as(
            "SELECT user_id, expires_at, revoked FROM refresh_tokens WHERE token = ?",
        )
        .bind(refresh_token)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some((owner, expires_at, revoked)) if owner == user_id && !revoked && expires_at > now => {
                let access = self.keys.issue(user_id, TokenKind::Access)?;
                Ok(AccessTokenResponse {
                    access_token: access.token,
                    token_type: TOKEN_TYPE.to_string(),
                })
            }
            Some(_) => Err(AuthError::InvalidToken("refresh token revoked or expired".to_string())),
            None => Err(AuthError::InvalidToken("unknown refresh token".to_string())),
        }
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token = ?")
            .bind(refresh_token)
            .execute(&self.db)
            .await?;

        info!(revoked = result.rows_affected(), "Logout");
        Ok(())
    }

    /// Hard-delete the account; personas, sessions and tokens cascade.
    pub async fn withdraw(&self, user_id: i64, req: WithdrawRequest) -> Result<(), AuthError> {
        let user = self.find_by_id(user_id).await?.ok_or(AuthError::UserNotFound)?;

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id, "Withdraw refused: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(
            user_id,
            reason = req.reason.as_deref().unwrap_or("-"),
            "User withdrew"
        );
        Ok(())
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRow>, AuthError> {
        Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AuthError> {
        Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count.0 > 0)
    }
}
