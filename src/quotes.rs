use std::sync::Arc;

use tracing::warn;

use crate::{
    api::ApiClient,
    error::ApiError,
    models::{Quote, QuoteListing},
};

const QUOTE_FIELDS: &str = "quote::default,quote:shuttle_times,location::default,location:timezone,location:site_url,location:address2,location:description,location:msa,location:rating_summary";
const QUOTE_RETURNS: &str = "curated offstreet_bookable_sold_out offstreet_bookable";

pub struct QuoteFetcher {
    api: Arc<dyn ApiClient>,
    email: String,
}

impl QuoteFetcher {
    pub fn new(api: Arc<dyn ApiClient>, email: impl Into<String>) -> Self {
        Self {
            api,
            email: email.into(),
        }
    }

    /// Quotes for one event. Any failure reads as "nothing available yet".
    pub async fn fetch(&self, event_id: &str) -> Vec<Quote> {
        match self.try_fetch(event_id).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(event_id, "Fetching quotes failed: {e}");
                vec![]
            }
        }
    }

    pub async fn try_fetch(&self, event_id: &str) -> Result<Vec<Quote>, ApiError> {
        let query = [
            ("q", format!("event_id:{event_id}")),
            ("fields", QUOTE_FIELDS.to_string()),
            ("option_types", "all".to_string()),
            ("returns", QUOTE_RETURNS.to_string()),
            ("email", self.email.clone()),
            ("routing_style", "parkwhiz".to_string()),
            ("capabilities", "capture_plate:always".to_string()),
        ];

        let value = self.api.get("quotes", &query).await?;
        let listing: QuoteListing =
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(listing.data)
    }
}
