// Booking the first purchase option that goes through

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    api::ApiClient,
    error::ApiError,
    models::{PurchaseOption, Quote},
};

pub struct BookingAttempt {
    api: Arc<dyn ApiClient>,
    email: String,
    plate_number: String,
    dry_run: bool,
}

impl BookingAttempt {
    pub fn new(
        api: Arc<dyn ApiClient>,
        email: impl Into<String>,
        plate_number: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            email: email.into(),
            plate_number: plate_number.into(),
            dry_run,
        }
    }

    /// Scan quotes and their options in order, stopping at the first success.
    pub async fn attempt(&self, quotes: &[Quote]) -> bool {
        for quote in quotes {
            for option in &quote.purchase_options {
                match self.book(option).await {
                    Ok(true) => {
                        info!(option_id = %option.id, price = ?option.price, "Booked space");
                        return true;
                    }
                    Ok(false) => warn!(option_id = %option.id, "Booking returned no confirmation"),
                    Err(e) => warn!(option_id = %option.id, "Booking failed: {e}"),
                }
            }
        }
        false
    }

    pub async fn book(&self, option: &PurchaseOption) -> Result<bool, ApiError> {
        if self.dry_run {
            info!(option_id = %option.id, "Dry run, skipping booking request");
            return Ok(true);
        }

        let form = [
            ("customer_email", self.email.clone()),
            ("quote_id", option.id.clone()),
            ("final_price", "0.0".to_string()),
            ("plate_number", self.plate_number.clone()),
        ];
        let response = self.api.post("bookings", &form).await?;
        Ok(is_confirmation(&response))
    }
}

fn is_confirmation(response: &Value) -> bool {
    match response {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |v| v != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedApi;
    use serde_json::json;

    fn quote(option_ids: &[&str]) -> Quote {
        Quote {
            id: None,
            event_id: Some("e1".to_string()),
            purchase_options: option_ids
                .iter()
                .map(|id| PurchaseOption {
                    id: id.to_string(),
                    price: None,
                })
                .collect(),
        }
    }

    fn booked_ids(api: &ScriptedApi) -> Vec<String> {
        api.calls("POST", "bookings")
            .iter()
            .map(|form| form["quote_id"].clone())
            .collect()
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let api = Arc::new(ScriptedApi::new());
        api.script_post("bookings", Ok(json!({ "id": 900 })));

        let booking = BookingAttempt::new(api.clone(), "fan@example.com", "ABC123", false);
        assert!(booking.attempt(&[quote(&["a", "b"]), quote(&["c"])]).await);
        assert_eq!(booked_ids(&api), vec!["a"]);

        let form = &api.calls("POST", "bookings")[0];
        assert_eq!(form["plate_number"], "ABC123");
        assert_eq!(form["customer_email"], "fan@example.com");
        assert_eq!(form["final_price"], "0.0");
    }

    #[tokio::test]
    async fn test_failures_continue_scan() {
        let api = Arc::new(ScriptedApi::new());
        api.script_post(
            "bookings",
            Err(ApiError::Status {
                status: 409,
                body: "taken".to_string(),
            }),
        );
        api.script_post("bookings", Ok(json!({})));
        api.script_post("bookings", Ok(json!({ "id": 901 })));

        let booking = BookingAttempt::new(api.clone(), "fan@example.com", "ABC123", false);
        assert!(booking.attempt(&[quote(&["a", "b"]), quote(&["c", "d"])]).await);
        assert_eq!(booked_ids(&api), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_exhausted_options_return_false() {
        let api = Arc::new(ScriptedApi::new());
        api.script_post("bookings", Ok(Value::Null));

        let booking = BookingAttempt::new(api.clone(), "fan@example.com", "ABC123", false);
        assert!(!booking.attempt(&[quote(&["a"]), quote(&["b"])]).await);
        assert_eq!(booked_ids(&api), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_api() {
        let api = Arc::new(ScriptedApi::new());

        let booking = BookingAttempt::new(api.clone(), "fan@example.com", "ABC123", true);
        assert!(booking.attempt(&[quote(&["a", "b"])]).await);
        assert_eq!(api.total_calls(), 0);
    }

    #[test]
    fn test_confirmation_truthiness() {
        assert!(is_confirmation(&json!({ "id": 1 })));
        assert!(is_confirmation(&json!([1])));
        assert!(!is_confirmation(&json!({})));
        assert!(!is_confirmation(&json!([])));
        assert!(!is_confirmation(&json!(false)));
        assert!(!is_confirmation(&json!("")));
        assert!(!is_confirmation(&json!(0)));
        assert!(!is_confirmation(&json!(0.0)));
        assert!(is_confirmation(&json!(42)));
    }
}
