use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{Storage, StorageError};

/// Durable slot holding the signed-in profile.
pub const USER_SLOT: &str = "user";

/// The locally stored profile. Sign-in is a stub by scope; there are no
/// credentials and nothing is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

/// Local sign-in stub persisting one profile to its own slot.
pub struct SignIn {
    storage: Arc<dyn Storage>,
}

impl SignIn {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The signed-in profile, if any. Unreadable slot data counts as
    /// signed out.
    pub fn current(&self) -> Option<UserProfile> {
        match self.storage.get(USER_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "unreadable profile, treating as signed out");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "profile read failed, treating as signed out");
                None
            }
        }
    }

    /// Sign in with an email; the display name is the address's local part.
    pub fn sign_in(&self, email: &str) -> Result<UserProfile, StorageError> {
        let name = email.split('@').next().unwrap_or(email).to_string();
        self.store(UserProfile {
            name,
            email: email.to_string(),
        })
    }

    /// Sign up with an explicit display name.
    pub fn sign_up(&self, name: &str, email: &str) -> Result<UserProfile, StorageError> {
        self.store(UserProfile {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// Forget the signed-in profile.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.storage.delete(USER_SLOT)
    }

    fn store(&self, profile: UserProfile) -> Result<UserProfile, StorageError> {
        let encoded = serde_json::to_string(&profile)?;
        self.storage.put(USER_SLOT, &encoded)?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn sign_in_derives_name_from_email() {
        let auth = SignIn::new(Arc::new(MemoryStorage::new()));
        let profile = auth.sign_in("jordan@example.edu").unwrap();
        assert_eq!(profile.name, "jordan");
        assert_eq!(auth.current(), Some(profile));
    }

    #[test]
    fn sign_out_forgets_profile() {
        let auth = SignIn::new(Arc::new(MemoryStorage::new()));
        auth.sign_up("Jordan", "jordan@example.edu").unwrap();
        auth.sign_out().unwrap();
        assert!(auth.current().is_none());
        auth.sign_out().unwrap();
    }

    #[test]
    fn corrupt_profile_counts_as_signed_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(USER_SLOT, "{broken").unwrap();
        let auth = SignIn::new(storage);
        assert!(auth.current().is_none());
    }
}
