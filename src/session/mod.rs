//! Session state: the single source of truth every screen consults.
//!
//! `SessionService` wraps the [`CredentialStore`](store::CredentialStore)
//! and adds reactive change notification for the current user, menu tree,
//! and capability map via `tokio::sync::watch`: synchronous current-value
//! reads, subscription by receiver, unsubscription by drop.

pub mod capability;
pub mod guard;
pub mod menu;
pub mod notice;
pub mod store;

use crate::api::{ApiClient, Error};
use capability::Capabilities;
use menu::MenuItem;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::CredentialStore;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn display_name(user: &Value) -> Option<String> {
    let name = [user["prenom"].as_str(), user["nom"].as_str()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.trim().is_empty()).then(|| name.trim().to_string())
}

impl AuthUser {
    /// Normalize the `user` object embedded in a login/2FA/federated
    /// response. Requires an id and a login; everything else has defaults.
    #[must_use]
    pub fn from_login_response(user: &Value) -> Option<Self> {
        let id = value_to_string(&user["id"])?;
        let login = user["login"].as_str().filter(|s| !s.is_empty())?.to_string();
        let role = value_to_string(&user["role"])
            .or_else(|| value_to_string(&user["profil"]))
            .unwrap_or_else(|| "Utilisateur".to_string());

        Some(Self {
            id,
            login,
            email: user["email"].as_str().unwrap_or_default().to_string(),
            roles: vec![role],
            name: display_name(user),
        })
    }

    /// Normalize the authoritative user from a session-refresh response,
    /// where the role arrives as a separate `role` object.
    #[must_use]
    pub fn from_me_response(me: &Value) -> Option<Self> {
        let user = &me["user"];
        let id = value_to_string(&user["id"])?;
        let login = value_to_string(&user["login"])?;
        let role = value_to_string(&me["role"]["code"])
            .or_else(|| value_to_string(&me["role"]["nom"]))
            .unwrap_or_else(|| "Utilisateur".to_string());

        Some(Self {
            id,
            login,
            email: user["email"].as_str().unwrap_or_default().to_string(),
            roles: vec![role],
            name: display_name(user),
        })
    }
}

/// Result of handling a primary credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    TwoFactorRequired { user_id: u64 },
}

/// ANONYMOUS -> AUTHENTICATING -> AUTHENTICATED -> ANONYMOUS (logout or
/// forced expiry). There is no externally observable "refreshing" state: a
/// stale-but-present capability map is preferred over blocking consumers.
///
/// Concurrent session refreshes are not sequenced; if two are in flight the
/// last response to arrive wins, matching the observed behavior this client
/// reimplements.
pub struct SessionService {
    store: CredentialStore,
    user: watch::Sender<Option<AuthUser>>,
    menus: watch::Sender<Vec<MenuItem>>,
    capabilities: watch::Sender<Capabilities>,
}

impl SessionService {
    /// Build the service and hydrate it from whatever the persistence tiers
    /// still hold: token, then user (only if it carries an id and a login),
    /// then capabilities. Corrupt entries are ignored.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        let token_present = store.token().is_some();
        let user = store
            .user()
            .filter(|u| !u.id.is_empty() && !u.login.is_empty());
        let capabilities = store.capabilities();

        debug!(
            token_present,
            user_cached = user.is_some(),
            "session hydrated from storage"
        );

        Self {
            store,
            user: watch::Sender::new(user),
            menus: watch::Sender::new(Vec::new()),
            capabilities: watch::Sender::new(capabilities),
        }
    }

    /// Token presence only; validity is the backend's call, surfaced through
    /// 401 handling.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.token().is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.store.token()
    }

    pub fn set_auth_token(&self, token: &str, remember: bool) {
        self.store.set_token(token, remember);
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.user.borrow().clone()
    }

    pub fn set_current_user(&self, user: AuthUser) {
        self.store.set_user(&user);
        self.user.send_replace(Some(user));
    }

    #[must_use]
    pub fn menus(&self) -> Vec<MenuItem> {
        self.menus.borrow().clone()
    }

    pub fn set_menus(&self, menus: Vec<MenuItem>) {
        self.menus.send_replace(menus);
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.borrow().clone()
    }

    /// Replaces the whole capability map; maps are never merged.
    pub fn set_capabilities(&self, capabilities: Capabilities, remember: Option<bool>) {
        self.store.set_capabilities(&capabilities, remember);
        self.capabilities.send_replace(capabilities);
    }

    #[must_use]
    pub fn can(&self, module: &str, action: &str) -> bool {
        capability::allowed(&self.capabilities.borrow(), module, action)
    }

    pub fn user_changes(&self) -> watch::Receiver<Option<AuthUser>> {
        self.user.subscribe()
    }

    pub fn menu_changes(&self) -> watch::Receiver<Vec<MenuItem>> {
        self.menus.subscribe()
    }

    pub fn capability_changes(&self) -> watch::Receiver<Capabilities> {
        self.capabilities.subscribe()
    }

    /// Clears the store and resets every stream. Idempotent; the caller is
    /// expected to navigate to the login route afterwards.
    pub fn logout(&self) {
        self.store.clear();
        self.user.send_replace(None);
        self.menus.send_replace(Vec::new());
        self.capabilities.send_replace(Capabilities::default());
    }

    /// Handle a successful primary credential exchange (login, 2FA
    /// verification, or federated sign-in).
    ///
    /// Stores the token and any embedded user, then runs the session refresh
    /// for the authoritative user, menus, and capabilities. A failing
    /// refresh falls back to the legacy menu endpoint; a failing fallback is
    /// logged and ignored; login never hard-fails once the token exchange
    /// succeeded.
    ///
    /// # Errors
    /// Returns an error only when the response carries no token at all.
    pub async fn handle_login_success(
        &self,
        client: &ApiClient,
        response: &Value,
        remember: bool,
    ) -> Result<LoginOutcome, Error> {
        if response["requires_2fa"].as_bool() == Some(true) {
            if let Some(user_id) = response["user_id"].as_u64() {
                return Ok(LoginOutcome::TwoFactorRequired { user_id });
            }
        }

        let token = response["access_token"]
            .as_str()
            .or_else(|| response["token"].as_str())
            .ok_or(Error::MissingToken)?;
        self.set_auth_token(token, remember);

        if let Some(user) = AuthUser::from_login_response(&response["user"]) {
            self.set_current_user(user);
        }

        match client.fetch_me().await {
            Ok(me) => self.apply_refresh(&me, Some(remember)),
            Err(err) => {
                warn!("session refresh failed, falling back to menu endpoint: {err}");
                match client.load_menus().await {
                    Ok(raw) => {
                        self.set_menus(menu::map_api_menus(&raw["menus"]));
                        if let Some(user) = AuthUser::from_login_response(&raw["user"]) {
                            self.set_current_user(user);
                        }
                    }
                    Err(err) => warn!("menu fallback failed: {err}"),
                }
            }
        }

        Ok(LoginOutcome::Authenticated)
    }

    /// Apply a session-refresh payload in a fixed order: user, then menus,
    /// then capabilities. Fields the backend omitted leave the current value
    /// untouched, except capabilities where an explicit object fully
    /// replaces the map.
    pub fn apply_refresh(&self, me: &Value, remember: Option<bool>) {
        if let Some(user) = AuthUser::from_me_response(me) {
            self.set_current_user(user);
        }

        if me["menus"].is_array() {
            self.set_menus(menu::map_api_menus(&me["menus"]));
        }

        if me["capabilities"].is_object() {
            match serde_json::from_value::<Capabilities>(me["capabilities"].clone()) {
                Ok(capabilities) => self.set_capabilities(capabilities, remember),
                Err(err) => debug!("discarding malformed capability map: {err}"),
            }
        }
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user.borrow().as_ref().map(|u| u.login.clone()))
            .finish_non_exhaustive()
    }
}
