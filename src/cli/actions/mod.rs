pub mod login;
pub mod session;

use crate::api::ApiClient;
use crate::cli::globals::GlobalArgs;
use crate::session::guard::Navigator;
use crate::session::notice::NoticeCenter;
use crate::session::store::{CredentialStore, FileTier, MemoryTier};
use crate::session::SessionService;
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

#[derive(Debug)]
pub enum Action {
    Login {
        login: String,
        password: SecretString,
        remember: bool,
        code: Option<String>,
    },
    Whoami,
    Menus,
    Can { module: String, action: String },
    Logout,
}

/// Shared wiring for every action: credential store (durable tier under the
/// state dir, session tier in memory), session service hydrated from it,
/// notices, navigator, and the authenticated API client.
pub struct AppContext {
    pub session: Arc<SessionService>,
    pub client: ApiClient,
    pub notices: Arc<NoticeCenter>,
    pub navigator: Arc<Navigator>,
}

impl AppContext {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        let store = CredentialStore::new(
            FileTier::new(globals.state_dir.clone()),
            MemoryTier::default(),
        );
        let session = Arc::new(SessionService::new(store));
        let notices = Arc::new(NoticeCenter::new());
        let navigator = Arc::new(Navigator::new());
        let client = ApiClient::new(
            globals.api_url.clone(),
            Arc::clone(&session),
            Arc::clone(&notices),
            Arc::clone(&navigator),
        )?;

        Ok(Self {
            session,
            client,
            notices,
            navigator,
        })
    }
}
