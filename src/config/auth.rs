// src/config/auth.rs
// JWT signing configuration

use serde::{Deserialize, Serialize};

use super::helpers::{env_or, env_parsed_or};

/// HS256 needs at least 256 bits of key material
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime (default 15 minutes)
    pub access_ttl_secs: i64,
    /// Refresh token lifetime (default 7 days)
    pub refresh_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env_or("JWT_SECRET", ""),
            access_ttl_secs: env_parsed_or("JWT_ACCESS_TTL_SECS", 15 * 60),
            refresh_ttl_secs: env_parsed_or("JWT_REFRESH_TTL_SECS", 7 * 24 * 60 * 60),
            bcrypt_cost: env_parsed_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            ));
        }

        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(anyhow::anyhow!("JWT token lifetimes must be positive"));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(anyhow::anyhow!("BCRYPT_COST must be between 4 and 31"));
        }

        Ok(())
    }
}
