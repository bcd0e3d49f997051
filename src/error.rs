use thiserror::Error;

// Failures while obtaining a bearer token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Login rejected: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed token response: {0}")]
    MalformedToken(String),

    #[error("Network error during login: {0}")]
    Network(String),
}

// Failures surfaced by the API client to its immediate caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Re-authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
