use super::auth::require_verified;
use crate::db::repositories::UserRepository;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::models::{UpdateUser, User};
use chrono::Utc;
use tracing::{info, instrument};

/// Apply the provided fields of `changes` to `user`
pub fn apply_user_changes(user: &mut User, changes: UpdateUser) {
    if let Some(full_name) = changes.full_name {
        user.full_name = full_name;
    }
    if changes.phone_number.is_some() {
        user.phone_number = changes.phone_number;
    }
    if changes.date_of_birth.is_some() {
        user.date_of_birth = changes.date_of_birth;
    }
    if changes.address.is_some() {
        user.address = changes.address;
    }
    if changes.tax_residence.is_some() {
        user.tax_residence = changes.tax_residence;
    }
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    #[instrument(skip(self, user, changes), fields(user_id = %user.id))]
    pub async fn update(&self, user: &User, changes: UpdateUser) -> Result<User, ServiceError> {
        let mut updated = user.clone();
        apply_user_changes(&mut updated, changes);
        updated.updated_at = Utc::now();
        self.users.update(&updated).await?;
        Ok(updated)
    }

    /// Soft delete: the account is deactivated, its data kept
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn deactivate(&self, user: &User) -> Result<(), ServiceError> {
        require_verified(user)?;
        let mut updated = user.clone();
        updated.is_active = false;
        updated.updated_at = Utc::now();
        self.users.update(&updated).await?;
        info!(user_id = %user.id, "Account deactivated");
        Ok(())
    }
}
