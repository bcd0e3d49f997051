// Wire and domain types for the parking marketplace

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::work_queue::QueueKey;

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub start_time: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub venue_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Event {
    pub fn day(&self) -> Option<NaiveDate> {
        calendar_day(&self.start_time)
    }
}

impl QueueKey for Event {
    type Key = String;

    fn queue_key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Quote {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub purchase_options: Vec<PurchaseOption>,
}

impl Quote {
    pub fn has_options(&self) -> bool {
        !self.purchase_options.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PurchaseOption {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Kept as the raw payload; booking always sends a zero final price.
    #[serde(default)]
    pub price: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteListing {
    #[serde(default)]
    pub data: Vec<Quote>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Booking {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub event_id: Option<String>,
    pub start_time: String,
    #[serde(default)]
    pub cancelled_at: Option<String>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.cancelled_at.is_none()
    }

    pub fn day(&self) -> Option<NaiveDate> {
        calendar_day(&self.start_time)
    }
}

/// Calendar day of a timestamp as written, ignoring time-of-day and offset.
pub fn calendar_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
