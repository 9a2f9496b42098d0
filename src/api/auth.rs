//! Authentication endpoints.
//!
//! Responses are loosely shaped (`token` vs `access_token`, optional user,
//! optional 2FA marker), so they are returned as raw JSON and normalized by
//! the session layer.

use crate::api::{ApiClient, Error};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

impl ApiClient {
    /// Primary credential exchange.
    /// # Errors
    /// Propagates pipeline errors; invalid credentials surface as a status
    /// error carrying the backend message.
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<Value, Error> {
        let payload = json!({
            "login": login,
            "password": password.expose_secret(),
        });
        self.request_json(Method::POST, "/api/auth/login", Some(&payload))
            .await
    }

    /// Second-factor verification for a login that answered `requires_2fa`.
    /// # Errors
    /// Propagates pipeline errors.
    pub async fn verify_2fa(&self, user_id: u64, code: &str) -> Result<Value, Error> {
        let payload = json!({
            "user_id": user_id,
            "code": code,
        });
        self.request_json(Method::POST, "/api/auth/verify-2fa", Some(&payload))
            .await
    }

    /// Federated sign-in: exchange a Google ID token for a session token.
    /// # Errors
    /// Propagates pipeline errors.
    pub async fn google_login(&self, id_token: &str) -> Result<Value, Error> {
        let payload = json!({ "token": id_token });
        self.request_json(Method::POST, "/api/auth/google/login", Some(&payload))
            .await
    }

    /// Session refresh: the authoritative user, menu tree, and capability
    /// map in one call. Without a cached token this short-circuits to an
    /// unsuccessful body instead of sending a request that can only 401.
    /// # Errors
    /// Propagates pipeline errors.
    pub async fn fetch_me(&self) -> Result<Value, Error> {
        if self.session().token().is_none() {
            return Ok(json!({ "success": false }));
        }
        self.request_json(Method::GET, "/api/auth/me", None).await
    }

    /// Legacy menu fetch, used as the fallback when the session refresh
    /// fails. Without a token it yields an empty menu list.
    /// # Errors
    /// Propagates pipeline errors.
    pub async fn load_menus(&self) -> Result<Value, Error> {
        if self.session().token().is_none() {
            return Ok(json!({ "menus": [] }));
        }
        self.request_json(Method::GET, "/api/administrations/menus", None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::guard::Navigator;
    use crate::session::notice::NoticeCenter;
    use crate::session::store::{CredentialStore, MemoryTier};
    use crate::session::SessionService;
    use std::net::TcpListener;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(base_url: &str) -> ApiClient {
        let session = Arc::new(SessionService::new(CredentialStore::new(
            MemoryTier::default(),
            MemoryTier::default(),
        )));
        ApiClient::new(
            base_url,
            session,
            Arc::new(NoticeCenter::new()),
            Arc::new(Navigator::new()),
        )
        .expect("client")
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"login": "alice", "password": "s3cret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let password = SecretString::from("s3cret".to_string());
        let response = client.login("alice", &password).await.expect("response");
        assert_eq!(response["token"], json!("abc123"));
    }

    #[tokio::test]
    async fn verify_2fa_posts_user_id_and_code() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/verify-2fa"))
            .and(body_json(json!({"user_id": 7, "code": "123456"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc123"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let response = client.verify_2fa(7, "123456").await.expect("response");
        assert_eq!(response["access_token"], json!("abc123"));
    }

    #[tokio::test]
    async fn google_login_posts_the_id_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/google/login"))
            .and(body_json(json!({"token": "google-id-token"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc123"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let response = client
            .google_login("google-id-token")
            .await
            .expect("response");
        assert_eq!(response["token"], json!("abc123"));
    }

    #[tokio::test]
    async fn fetch_me_without_token_short_circuits() {
        let client = client_for("http://localhost:9");

        let me = client.fetch_me().await.expect("response");
        assert_eq!(me["success"], json!(false));

        let menus = client.load_menus().await.expect("response");
        assert!(menus["menus"].as_array().is_some_and(|m| m.is_empty()));
    }
}
