// Token issuing, password hashing and reset-token helpers

use crate::errors::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

pub const RESET_TOKEN_LENGTH: usize = 32;
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;':,.<>?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::CouldNotValidateCredentials)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// HS256 token service for access and refresh tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    #[instrument(skip(secret))]
    pub fn new(secret: &str, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        }
    }

    pub fn encode_token(&self, user_id: Uuid, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))
    }

    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.encode_token(user_id, TokenType::Access)?,
            refresh_token: self.encode_token(user_id, TokenType::Refresh)?,
            token_type: "bearer".to_string(),
        })
    }

    #[instrument(skip(self, token))]
    pub fn decode_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected JWT");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })
    }

    /// Decode a bearer token and require it to be an access token
    pub fn verify_access(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self
            .decode_token(token)
            .map_err(|_| AuthError::CouldNotValidateCredentials)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::CouldNotValidateCredentials);
        }
        claims.user_id()
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self
            .decode_token(token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidRefreshToken);
        }
        claims.user_id().map_err(|_| AuthError::InvalidRefreshToken)
    }
}

/// Check the password rules in order, reporting the first failure
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    let rule = if password.chars().count() < 8 {
        Some("Password must be at least 8 characters long")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one digit")
    } else if !password.chars().any(|c| c.is_uppercase()) {
        Some("Password must contain at least one uppercase letter")
    } else if !password.chars().any(|c| c.is_lowercase()) {
        Some("Password must contain at least one lowercase letter")
    } else if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        Some("Password must contain at least one special character")
    } else {
        None
    };

    match rule {
        Some(message) => Err(AuthError::WeakPassword(message.to_string())),
        None => Ok(()),
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::HashingFailed(e.to_string()))
}

/// A malformed stored hash counts as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Reset tokens are stored as their SHA-256 digest
pub fn digest_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
