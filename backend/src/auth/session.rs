//! Identity to profile synchronization.
//!
//! A [`Session`] is built per request: the verified [`Identity`] (if any)
//! plus the matching [`UserProfile`]. [`SessionBridge::sync`] fetches the
//! profile row, creating it with the default role on first sign-in.

use std::sync::Arc;

use axent_common::{ProfileUpdate, Role, UserProfile};

use super::Identity;
use crate::store::{ProfileStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request-scoped view of who is signed in.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    profile: Option<UserProfile>,
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Role used for access decisions. `None` without a profile.
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    /// Identity token to forward to the data store.
    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.token.as_str())
    }

    /// Change the signed-in user's role. The local copy changes only after
    /// the store accepts the write.
    pub async fn update_role(&mut self, store: &dyn ProfileStore, role: Role) -> Result<(), SessionError> {
        let token = self.token().map(str::to_string);
        let profile = self.profile.as_mut().ok_or(SessionError::NotSignedIn)?;

        store.update_role(&profile.id, role, token.as_deref()).await?;

        tracing::info!(profile_id = %profile.id, from = %profile.role, to = %role, "Role updated");
        profile.role = role;
        Ok(())
    }

    /// Apply a partial profile edit, remote first.
    pub async fn update_profile(
        &mut self,
        store: &dyn ProfileStore,
        update: &ProfileUpdate,
    ) -> Result<(), SessionError> {
        let token = self.token().map(str::to_string);
        let profile = self.profile.as_mut().ok_or(SessionError::NotSignedIn)?;

        if update.is_empty() {
            return Ok(());
        }

        store.update_profile(&profile.id, update, token.as_deref()).await?;
        profile.apply(update);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        self.profile = None;
    }
}

/// Builds sessions from verified identities against a profile store.
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn ProfileStore>,
}

impl SessionBridge {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ProfileStore {
        self.store.as_ref()
    }

    /// Resolve the profile for `identity`, creating it on first sign-in.
    pub async fn sync(&self, identity: Option<Identity>) -> Session {
        let Some(identity) = identity else {
            return Session::signed_out();
        };
        let token = Some(identity.token.as_str());

        let existing = match self.store.fetch_profile(&identity.sub, token).await {
            Ok(found) => found,
            Err(StoreError::InvalidRole(e)) => {
                tracing::error!(profile_id = %identity.sub, error = %e, "Profile row has an illegal role");
                return Session {
                    identity: Some(identity),
                    profile: None,
                };
            }
            Err(e) => {
                tracing::warn!(profile_id = %identity.sub, error = %e, "Profile fetch failed, treating as absent");
                None
            }
        };

        let profile = match existing {
            Some(mut profile) => {
                fill_from_identity(&mut profile, &identity);
                profile
            }
            None => {
                let profile = default_profile(&identity);
                match self.store.insert_profile(&profile, token).await {
                    Ok(()) => tracing::info!(profile_id = %profile.id, "Created profile on first sign-in"),
                    Err(e) => tracing::warn!(
                        profile_id = %profile.id,
                        error = %e,
                        "Profile insert failed, using default profile for this session"
                    ),
                }
                profile
            }
        };

        Session {
            identity: Some(identity),
            profile: Some(profile),
        }
    }
}

fn default_profile(identity: &Identity) -> UserProfile {
    UserProfile {
        id: identity.sub.clone(),
        email: identity.email.clone().unwrap_or_default(),
        name: identity.name.clone(),
        role: Role::DEFAULT,
        location: None,
        avatar: identity.avatar.clone(),
        phone: None,
    }
}

fn fill_from_identity(profile: &mut UserProfile, identity: &Identity) {
    if profile.name.trim().is_empty() {
        profile.name = identity.name.clone();
    }
    if profile.email.is_empty() {
        if let Some(email) = &identity.email {
            profile.email = email.clone();
        }
    }
    if profile.avatar.is_none() {
        profile.avatar = identity.avatar.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{test_identity, InMemoryStore};

    fn bridge(store: &Arc<InMemoryStore>) -> SessionBridge {
        SessionBridge::new(store.clone())
    }

    #[tokio::test]
    async fn test_signed_out_sync() {
        let store = Arc::new(InMemoryStore::new());
        let session = bridge(&store).sync(None).await;
        assert!(!session.is_authenticated());
        assert!(session.role().is_none());
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_customer_profile() {
        let store = Arc::new(InMemoryStore::new());
        let session = bridge(&store).sync(Some(test_identity("user_new"))).await;

        let profile = session.profile().unwrap();
        assert_eq!(profile.role, Role::Customer);
        assert_eq!(profile.name, "Test User");
        assert_eq!(profile.email, "user_new@example.com");
        assert_eq!(profile.avatar.as_deref(), Some("https://img.example.com/user_new.png"));
        assert_eq!(store.profile("user_new").unwrap(), *profile);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let bridge = bridge(&store);

        let first = bridge.sync(Some(test_identity("user_a"))).await;
        let second = bridge.sync(Some(test_identity("user_a"))).await;

        assert_eq!(first.profile(), second.profile());
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_profile_keeps_stored_role() {
        let store = Arc::new(InMemoryStore::new());
        store.put_profile(UserProfile {
            id: "user_p".to_string(),
            email: String::new(),
            name: "Ravi Transport".to_string(),
            role: Role::Provider,
            location: None,
            avatar: None,
            phone: Some("+91 98450 00000".to_string()),
        });

        let session = bridge(&store).sync(Some(test_identity("user_p"))).await;
        let profile = session.profile().unwrap();
        assert_eq!(profile.role, Role::Provider);
        assert_eq!(profile.name, "Ravi Transport");
        // empty fields are filled from the identity
        assert_eq!(profile.email, "user_p@example.com");
        assert!(profile.avatar.is_some());
    }

    #[tokio::test]
    async fn test_insert_failure_still_adopts_default_profile() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_writes(true);

        let session = bridge(&store).sync(Some(test_identity("user_x"))).await;
        assert_eq!(session.role(), Some(Role::Customer));
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_treated_as_absent() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_reads(true);

        let session = bridge(&store).sync(Some(test_identity("user_r"))).await;
        assert_eq!(session.role(), Some(Role::Customer));
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn test_illegal_role_row_yields_no_profile() {
        let store = Arc::new(InMemoryStore::new());
        store.put_invalid_role("user_bad", "superuser");

        let session = bridge(&store).sync(Some(test_identity("user_bad"))).await;
        assert!(!session.is_authenticated());
        assert!(session.identity().is_some());
    }

    #[tokio::test]
    async fn test_update_role_applies_after_store_write() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = bridge(&store).sync(Some(test_identity("user_u"))).await;

        session.update_role(store.as_ref(), Role::Organization).await.unwrap();
        assert_eq!(session.role(), Some(Role::Organization));
        assert_eq!(store.profile("user_u").unwrap().role, Role::Organization);
    }

    #[tokio::test]
    async fn test_failed_role_update_leaves_session_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = bridge(&store).sync(Some(test_identity("user_f"))).await;
        store.fail_writes(true);

        let result = session.update_role(store.as_ref(), Role::Admin).await;
        assert!(matches!(result, Err(SessionError::Store(_))));
        assert_eq!(session.role(), Some(Role::Customer));
    }

    #[tokio::test]
    async fn test_update_requires_profile() {
        let store = InMemoryStore::new();
        let mut session = Session::signed_out();
        let result = session.update_role(&store, Role::Provider).await;
        assert!(matches!(result, Err(SessionError::NotSignedIn)));

        let update = ProfileUpdate {
            phone: Some("1".to_string()),
            ..Default::default()
        };
        let result = session.update_profile(&store, &update).await;
        assert!(matches!(result, Err(SessionError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_update_profile_applies_fields() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = bridge(&store).sync(Some(test_identity("user_e"))).await;

        let update = ProfileUpdate {
            name: Some("Meera Shetty".to_string()),
            phone: Some("+91 90000 11111".to_string()),
            ..Default::default()
        };
        session.update_profile(store.as_ref(), &update).await.unwrap();

        let profile = session.profile().unwrap();
        assert_eq!(profile.name, "Meera Shetty");
        assert_eq!(profile.phone.as_deref(), Some("+91 90000 11111"));
        assert_eq!(store.profile("user_e").unwrap(), *profile);
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = bridge(&store).sync(Some(test_identity("user_o"))).await;
        session.sign_out();
        assert!(session.identity().is_none());
        assert!(session.profile().is_none());
    }
}
