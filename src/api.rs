// Authenticated JSON client for the parking marketplace

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{auth::AuthSession, config::ClientConfig, error::ApiError};

pub type Params<'a> = [(&'a str, String)];

#[async_trait]
pub trait ApiClient: Send + Sync + 'static {
    async fn get(&self, path: &str, query: &Params<'_>) -> Result<Value, ApiError>;

    // Body is form encoded, the way the marketplace expects it
    async fn post(&self, path: &str, form: &Params<'_>) -> Result<Value, ApiError>;
}

pub struct ParkingApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<AuthSession>,
}

impl ParkingApiClient {
    pub fn new(http: reqwest::Client, config: ClientConfig, session: Arc<AuthSession>) -> Self {
        Self {
            http,
            config,
            session,
        }
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Params<'_>,
        form: Option<&Params<'_>>,
    ) -> Result<Value, ApiError> {
        let url = self.config.url(path);
        let max_attempts = self.config.max_auth_attempts.max(1);
        let mut attempt = 1;

        loop {
            let credential = self.session.current();

            let mut request = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(form) = form {
                request = request.form(form);
            }
            if let Some(credential) = &credential {
                request = request.header(AUTHORIZATION, credential.bearer());
            }

            debug!(%method, %url, attempt, "Sending request");
            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && attempt < max_attempts {
                warn!(%url, attempt, "Session expired, logging in again");
                self.session.refresh_after(credential.as_ref()).await?;
                attempt += 1;
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()));
        }
    }
}

#[async_trait]
impl ApiClient for ParkingApiClient {
    async fn get(&self, path: &str, query: &Params<'_>) -> Result<Value, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, form: &Params<'_>) -> Result<Value, ApiError> {
        self.send(Method::POST, path, &[], Some(form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Login;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> ParkingApiClient {
        let config = ClientConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let http = reqwest::Client::new();
        let login = Login {
            email: "fan@example.com".to_string(),
            password: "secret".to_string(),
        };
        let session = Arc::new(AuthSession::new(http.clone(), &config, login));
        ParkingApiClient::new(http, config, session)
    }

    #[tokio::test]
    async fn test_get_sends_bearer_and_query() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/venues/7/events"))
            .and(query_param("page", "2"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_ok!(client.session().refresh().await);

        let value = assert_ok!(client.get("venues/7/events", &[("page", "2".to_string())]).await);
        assert_eq!(value, json!([{ "id": 1 }]));
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_then_succeeds() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/bookings"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bookings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value = assert_ok!(client.get("bookings", &[]).await);
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_unauthorized_gives_up_after_five_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })))
            .expect(4)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bookings"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .expect(5)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = assert_err!(client.get("bookings", &[]).await);
        assert_eq!(
            err,
            ApiError::Status {
                status: 401,
                body: "expired".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fresh" })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quotes"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = assert_err!(client.get("quotes", &[]).await);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_failed_refresh_surfaces_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bookings"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = assert_err!(client.get("bookings", &[]).await);
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_post_is_form_encoded_and_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bookings"))
            .and(body_string_contains("quote_id=q-1"))
            .and(body_string_contains("plate_number=ABC123"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let form = [
            ("quote_id", "q-1".to_string()),
            ("plate_number", "ABC123".to_string()),
        ];
        let value = assert_ok!(client.post("bookings", &form).await);
        assert_eq!(value, Value::Null);
    }
}
