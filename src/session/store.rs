//! Credential persistence across the two client-side tiers.
//!
//! The durable tier survives restarts ("remember me"), the session tier lives
//! only as long as the process. Exactly one tier holds the three session
//! artifacts at a time; `clear` wipes both so a tier switch cannot leave
//! orphaned data behind.

use crate::session::capability::Capabilities;
use crate::session::AuthUser;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";
pub const CAPABILITIES_KEY: &str = "auth_capabilities";

/// A key/value persistence scope. Implementations must degrade silently: a
/// failed read is `None`, a failed write is dropped.
pub trait StorageTier: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: StorageTier + ?Sized> StorageTier for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// Durable tier: one file per key under a state directory.
#[derive(Debug)]
pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StorageTier for FileTier {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            debug!("state dir {} not writable: {err}", self.dir.display());
            return;
        }
        if let Err(err) = fs::write(self.dir.join(key), value) {
            debug!("could not persist {key}: {err}");
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.dir.join(key));
    }
}

/// Session tier: in-process only, gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTier {
    map: RwLock<HashMap<String, String>>,
}

impl StorageTier for MemoryTier {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Reads and writes the three session artifacts (token, user, capabilities)
/// to the chosen tier and keeps an in-memory mirror of the token for
/// synchronous access.
pub struct CredentialStore {
    durable: Box<dyn StorageTier>,
    session: Box<dyn StorageTier>,
    token: RwLock<Option<SecretString>>,
}

impl CredentialStore {
    pub fn new(durable: impl StorageTier + 'static, session: impl StorageTier + 'static) -> Self {
        Self {
            durable: Box::new(durable),
            session: Box::new(session),
            token: RwLock::new(None),
        }
    }

    pub fn set_token(&self, token: &str, remember: bool) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(SecretString::from(token.to_string()));

        let tier: &dyn StorageTier = if remember {
            &*self.durable
        } else {
            &*self.session
        };
        tier.set(TOKEN_KEY, token);
    }

    /// In-memory token if present, otherwise a cold read of both tiers
    /// (durable first) that rehydrates the mirror. The fallback keeps a read
    /// before bootstrap completes from producing an empty auth header and a
    /// spurious 401.
    pub fn token(&self) -> Option<SecretString> {
        if let Some(token) = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Some(token);
        }

        let from_storage = self
            .durable
            .get(TOKEN_KEY)
            .or_else(|| self.session.get(TOKEN_KEY))?;
        let token = SecretString::from(from_storage);
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Some(token)
    }

    /// Persists the user in whichever tier already holds the token.
    pub fn set_user(&self, user: &AuthUser) {
        if let Ok(serialized) = serde_json::to_string(user) {
            self.active_tier().set(USER_KEY, &serialized);
        }
    }

    pub fn user(&self) -> Option<AuthUser> {
        let raw = self
            .durable
            .get(USER_KEY)
            .or_else(|| self.session.get(USER_KEY))?;
        serde_json::from_str(&raw).ok()
    }

    /// Persists the capability map. With `remember` omitted the tier is
    /// inferred from where the token currently lives.
    pub fn set_capabilities(&self, capabilities: &Capabilities, remember: Option<bool>) {
        let tier: &dyn StorageTier = match remember {
            Some(true) => &*self.durable,
            Some(false) => &*self.session,
            None => self.active_tier(),
        };
        if let Ok(serialized) = serde_json::to_string(capabilities) {
            tier.set(CAPABILITIES_KEY, &serialized);
        }
    }

    /// Cached capability map; a missing or corrupt entry yields no
    /// capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.durable
            .get(CAPABILITIES_KEY)
            .or_else(|| self.session.get(CAPABILITIES_KEY))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Removes all three artifacts from both tiers and resets the mirror.
    /// Idempotent.
    pub fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        for tier in [&self.durable, &self.session] {
            tier.remove(TOKEN_KEY);
            tier.remove(USER_KEY);
            tier.remove(CAPABILITIES_KEY);
        }
    }

    fn active_tier(&self) -> &dyn StorageTier {
        if self.durable.get(TOKEN_KEY).is_some() {
            &*self.durable
        } else {
            &*self.session
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field(
                "token",
                &self
                    .token
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .as_ref()
                    .map(|_| "<redacted>"),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn user() -> AuthUser {
        AuthUser {
            id: "7".to_string(),
            login: "alice".to_string(),
            email: "a@x.com".to_string(),
            roles: vec!["Utilisateur".to_string()],
            name: None,
        }
    }

    fn store_with_tiers() -> (CredentialStore, Arc<MemoryTier>, Arc<MemoryTier>) {
        let durable = Arc::new(MemoryTier::default());
        let session = Arc::new(MemoryTier::default());
        let store = CredentialStore::new(Arc::clone(&durable), Arc::clone(&session));
        (store, durable, session)
    }

    #[test]
    fn token_round_trip_remembered() {
        let (store, durable, session) = store_with_tiers();

        store.set_token("abc123", true);

        assert_eq!(
            store.token().map(|t| t.expose_secret().to_string()),
            Some("abc123".to_string())
        );
        assert_eq!(durable.get(TOKEN_KEY).as_deref(), Some("abc123"));
        assert_eq!(session.get(TOKEN_KEY), None);
    }

    #[test]
    fn token_round_trip_session_only() {
        let (store, durable, session) = store_with_tiers();

        store.set_token("abc123", false);

        assert_eq!(
            store.token().map(|t| t.expose_secret().to_string()),
            Some("abc123".to_string())
        );
        assert_eq!(durable.get(TOKEN_KEY), None);
        assert_eq!(session.get(TOKEN_KEY).as_deref(), Some("abc123"));
    }

    #[test]
    fn cold_read_rehydrates_from_durable_first() {
        let (store, durable, session) = store_with_tiers();
        durable.set(TOKEN_KEY, "from-durable");
        session.set(TOKEN_KEY, "from-session");

        assert_eq!(
            store.token().map(|t| t.expose_secret().to_string()),
            Some("from-durable".to_string())
        );
    }

    #[test]
    fn user_follows_token_tier() {
        let (store, durable, session) = store_with_tiers();

        store.set_token("abc123", false);
        store.set_user(&user());

        assert_eq!(durable.get(USER_KEY), None);
        assert!(session.get(USER_KEY).is_some());
        assert_eq!(store.user().map(|u| u.id), Some("7".to_string()));

        store.clear();
        store.set_token("abc123", true);
        store.set_user(&user());

        assert!(durable.get(USER_KEY).is_some());
        assert_eq!(session.get(USER_KEY), None);
    }

    #[test]
    fn capabilities_tier_inferred_from_token() {
        let (store, durable, session) = store_with_tiers();
        let caps: Capabilities = HashMap::from([(
            "patients".to_string(),
            HashMap::from([("create".to_string(), true)]),
        )]);

        store.set_token("abc123", true);
        store.set_capabilities(&caps, None);

        assert!(durable.get(CAPABILITIES_KEY).is_some());
        assert_eq!(session.get(CAPABILITIES_KEY), None);
        assert_eq!(store.capabilities(), caps);
    }

    #[test]
    fn corrupt_cached_values_degrade_to_empty() {
        let (store, durable, _session) = store_with_tiers();
        durable.set(USER_KEY, "{not json");
        durable.set(CAPABILITIES_KEY, "[42]");

        assert_eq!(store.user(), None);
        assert!(store.capabilities().is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let (store, durable, session) = store_with_tiers();
        store.set_token("abc123", true);
        store.set_user(&user());
        store.set_capabilities(&Capabilities::default(), None);

        store.clear();
        store.clear();

        assert!(store.token().is_none());
        assert_eq!(store.user(), None);
        assert!(store.capabilities().is_empty());
        for key in [TOKEN_KEY, USER_KEY, CAPABILITIES_KEY] {
            assert_eq!(durable.get(key), None);
            assert_eq!(session.get(key), None);
        }
    }

    #[test]
    fn file_tier_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tier = FileTier::new(dir.path().join("state"));

        tier.set(TOKEN_KEY, "abc123");
        assert_eq!(tier.get(TOKEN_KEY).as_deref(), Some("abc123"));

        tier.remove(TOKEN_KEY);
        assert_eq!(tier.get(TOKEN_KEY), None);
    }

    #[test]
    fn file_tier_missing_dir_reads_none() {
        let tier = FileTier::new("/nonexistent/clinigate-test");
        assert_eq!(tier.get(TOKEN_KEY), None);
    }
}
