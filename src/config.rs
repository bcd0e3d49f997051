use std::{fmt, time::Duration};

use chrono::NaiveDate;

pub const DEFAULT_BASE_URL: &str = "https://api.parkwhiz.com/v4";
pub const DEFAULT_VENUE_ID: u64 = 478498;

// Remote API configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub venue_id: u64,
    pub timeout_ms: u64,
    /// Total attempts for one request when the server keeps answering 401.
    pub max_auth_attempts: u32,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            venue_id: DEFAULT_VENUE_ID,
            timeout_ms: 30_000,
            max_auth_attempts: 5,
            page_size: 100,
        }
    }
}

impl ClientConfig {
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Clone, Default)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Everything a booking run needs
#[derive(Debug, Clone)]
pub struct BookerConfig {
    pub client: ClientConfig,
    pub login: Login,
    pub plate_number: String,
    /// Empty means "pick the default target date".
    pub dates: Vec<NaiveDate>,
    pub dry_run: bool,
    pub poll_interval: Duration,
}

impl Default for BookerConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            login: Login::default(),
            plate_number: String::new(),
            dates: vec![],
            dry_run: false,
            poll_interval: Duration::from_secs(3),
        }
    }
}
