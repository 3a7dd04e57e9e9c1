//! User lookup trait for the account data rotation depends on.

use async_trait::async_trait;

use crate::domain::entities::user::UserAccount;
use crate::errors::DomainError;

/// Read-only access to user accounts
///
/// Rotation consults this to re-check account status and to mint the new
/// access token from the user's current claims rather than the stale ones.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find a user by ID
    ///
    /// # Arguments
    /// * `user_id` - The user identifier carried by the refresh token record
    ///
    /// # Returns
    /// * `Ok(Some(UserAccount))` - User found
    /// * `Ok(None)` - No such user
    /// * `Err(DomainError)` - Lookup failed
    async fn get_by_id(&self, user_id: &str) -> Result<Option<UserAccount>, DomainError>;
}
