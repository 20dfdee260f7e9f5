// src/auth/mod.rs
// Account signup/login, JWT access + refresh tokens, bearer extraction

pub mod extractor;
pub mod jwt;
pub mod models;
pub mod password;
pub mod service;

use thiserror::Error;

pub use extractor::AuthUser;
pub use jwt::{Claims, JwtKeys, TokenKind};
pub use models::*;
pub use service::AuthService;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("{0}")]
    WeakPassword(String),
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Token encoding failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
