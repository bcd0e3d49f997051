// Bearer credential for the marketplace API.
// The active credential lives in one cell that is swapped whole on refresh;
// a request in flight keeps the `Arc` it cloned out while a refresh installs the next.

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    config::{ClientConfig, Login},
    error::AuthError,
    models::{Credential, TokenResponse},
};

pub struct AuthSession {
    http: reqwest::Client,
    token_url: String,
    login: Login,
    credential: RwLock<Option<Arc<Credential>>>,
    // Serialises refreshes so concurrent 401s trigger one login
    refresh_gate: Mutex<()>,
}

impl AuthSession {
    pub fn new(http: reqwest::Client, config: &ClientConfig, login: Login) -> Self {
        Self {
            http,
            token_url: config.url("oauth/token"),
            login,
            credential: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn email(&self) -> &str {
        &self.login.email
    }

    pub fn current(&self) -> Option<Arc<Credential>> {
        self.credential.read().clone()
    }

    /// Log in again and replace the active credential; a failure leaves it untouched.
    pub async fn refresh(&self) -> Result<Arc<Credential>, AuthError> {
        let _gate = self.refresh_gate.lock().await;
        self.login().await
    }

    /// Refresh unless another caller already replaced `stale` while we waited.
    pub async fn refresh_after(
        &self,
        stale: Option<&Arc<Credential>>,
    ) -> Result<Arc<Credential>, AuthError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.current() {
            let replaced = match stale {
                Some(stale) => !Arc::ptr_eq(stale, &current),
                None => true,
            };
            if replaced {
                debug!("Credential already refreshed by another request");
                return Ok(current);
            }
        }
        self.login().await
    }

    async fn login(&self) -> Result<Arc<Credential>, AuthError> {
        info!("Attempting to login user: {}", self.login.email);

        let form = [
            ("scope", "public"),
            ("grant_type", "password"),
            ("customer_email", self.login.email.as_str()),
            ("customer_password", self.login.password.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(AuthError::MalformedToken("empty access_token".to_string()));
        }

        let credential = Arc::new(Credential::new(token.access_token));
        *self.credential.write() = Some(credential.clone());
        Ok(credential)
    }
}

pub fn http_client(config: &ClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
}
