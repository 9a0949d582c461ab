use super::mailer::Mailer;
use super::oauth::{OAuthProvider, OAuthVerifier};
use crate::auth::{
    digest_reset_token, generate_reset_token, hash_password_with_cost,
    validate_password_strength, verify_password, JwtService, TokenPair,
};
use crate::config::AuthConfig;
use crate::db::repositories::UserRepository;
use crate::db::DbPool;
use crate::errors::{AuthError, DatabaseError, ServiceError};
use crate::models::{FinancialData, User, UserProfile};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const RESET_REQUESTED_MESSAGE: &str = "Password reset instructions sent to email";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthLoginRequest {
    pub provider: String,
    pub access_token: Option<String>,
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Confirmation and strength checks shared by every password-setting flow
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), AuthError> {
    if password != confirm {
        return Err(AuthError::PasswordMismatch);
    }
    validate_password_strength(password)
}

/// Registration, login and credential management
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtService,
    mailer: Arc<dyn Mailer>,
    oauth: Arc<dyn OAuthVerifier>,
    reset_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        pool: DbPool,
        config: &AuthConfig,
        mailer: Arc<dyn Mailer>,
        oauth: Arc<dyn OAuthVerifier>,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt: JwtService::new(
                &config.jwt_secret,
                config.access_token_expire_minutes,
                config.refresh_token_expire_days,
            ),
            mailer,
            oauth,
            reset_ttl: Duration::hours(config.password_reset_token_expire_hours),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower the bcrypt cost, for tests
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ServiceError> {
        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch.into());
        }
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }
        validate_password_strength(&request.password)?;

        let hash = hash_password_with_cost(&request.password, self.bcrypt_cost)?;
        let user = User::new_local(&request.email, &request.full_name, hash);
        self.create_with_defaults(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn create_with_defaults(&self, user: &User) -> Result<(), ServiceError> {
        let profile = UserProfile::new(user.id);
        let financial = FinancialData::new(profile.id);
        match self.users.create_with_profile(user, &profile, &financial).await {
            Err(DatabaseError::DuplicateKey(_)) => Err(AuthError::EmailAlreadyRegistered.into()),
            other => other.map_err(Into::into),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, ServiceError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .hashed_password
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&request.password, hash) {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::InactiveUser.into());
        }

        info!(user_id = %user.id, "User logged in");
        Ok(self.jwt.issue_pair(user.id)?)
    }

    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ServiceError> {
        let user_id = self.jwt.verify_refresh(refresh_token)?;
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(self.jwt.issue_pair(user.id)?),
            _ => Err(AuthError::InvalidUser.into()),
        }
    }

    /// Sign in with a provider token, creating a verified account on first use
    #[instrument(skip(self, request), fields(provider = %request.provider))]
    pub async fn oauth_login(&self, request: OAuthLoginRequest) -> Result<TokenPair, ServiceError> {
        let provider: OAuthProvider = request.provider.parse()?;
        let identity = self.oauth.verify(provider, &request.id_token).await?;

        let user = match self.users.find_by_email(&identity.email).await? {
            Some(mut user) => {
                if user.oauth_provider.is_none() {
                    user.oauth_provider = Some(provider.as_str().to_string());
                    user.oauth_id = Some(identity.subject.clone());
                    user.updated_at = Utc::now();
                    self.users.update(&user).await?;
                }
                user
            }
            None => {
                let user = User::new_oauth(
                    &identity.email,
                    &identity.name,
                    provider.as_str(),
                    &identity.subject,
                );
                self.create_with_defaults(&user).await?;
                info!(user_id = %user.id, "User registered through OAuth");
                user
            }
        };

        if !user.is_active {
            return Err(AuthError::InactiveUser.into());
        }
        Ok(self.jwt.issue_pair(user.id)?)
    }

    /// Store a reset token digest and mail the token. Unknown emails succeed
    /// silently so the endpoint does not reveal which accounts exist.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            return Ok(());
        };

        let token = generate_reset_token();
        user.reset_password_token = Some(digest_reset_token(&token));
        user.reset_password_token_expires = Some(Utc::now() + self.reset_ttl);
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        if let Err(e) = self.mailer.send_password_reset(&user.email, &token).await {
            warn!(user_id = %user.id, error = %e, "Could not send reset email");
        }
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn confirm_password_reset(
        &self,
        request: PasswordResetConfirm,
    ) -> Result<(), ServiceError> {
        let mut user = self
            .users
            .find_by_reset_token(&digest_reset_token(&request.token))
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        check_new_password(&request.new_password, &request.confirm_password)?;

        user.hashed_password = Some(hash_password_with_cost(
            &request.new_password,
            self.bcrypt_cost,
        )?);
        user.reset_password_token = None;
        user.reset_password_token_expires = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn change_password(
        &self,
        user: &User,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let current_ok = user
            .hashed_password
            .as_deref()
            .map(|hash| verify_password(&request.current_password, hash))
            .unwrap_or(false);
        if !current_ok {
            return Err(AuthError::IncorrectCurrentPassword.into());
        }

        check_new_password(&request.new_password, &request.confirm_password)?;
        if request.new_password == request.current_password {
            return Err(AuthError::PasswordUnchanged.into());
        }

        let mut updated = user.clone();
        updated.hashed_password = Some(hash_password_with_cost(
            &request.new_password,
            self.bcrypt_cost,
        )?);
        updated.updated_at = Utc::now();
        self.users.update(&updated).await?;
        Ok(())
    }

    /// Resolve a bearer access token to an active user
    pub async fn current_user(&self, token: &str) -> Result<User, ServiceError> {
        let user_id: Uuid = self.jwt.verify_access(token)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::CouldNotValidateCredentials)?;
        if !user.is_active {
            return Err(AuthError::InactiveUser.into());
        }
        Ok(user)
    }
}

/// Reject users who have not verified their email
pub fn require_verified(user: &User) -> Result<(), ServiceError> {
    if user.is_verified {
        Ok(())
    } else {
        Err(AuthError::UserNotVerified.into())
    }
}
