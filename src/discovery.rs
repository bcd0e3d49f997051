// Finding the venue events worth booking

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    api::ApiClient,
    error::ApiError,
    models::{Booking, Event},
};

pub struct EventDiscovery {
    api: Arc<dyn ApiClient>,
    page_size: usize,
}

impl EventDiscovery {
    pub fn new(api: Arc<dyn ApiClient>, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }

    /// Every event listed for the venue, across all pages.
    pub async fn venue_events(&self, venue_id: u64) -> Result<Vec<Event>, ApiError> {
        let path = format!("venues/{venue_id}/events");
        let mut results = Vec::new();
        let mut page = 1;

        loop {
            let query = [
                ("page", page.to_string()),
                ("per_page", self.page_size.to_string()),
            ];
            let events: Vec<Event> = decode_list(self.api.get(&path, &query).await?)?;
            let count = events.len();
            debug!(page, count, "Fetched venue events page");

            results.extend(events);
            if count < self.page_size {
                break;
            }
            page += 1;
        }

        Ok(results)
    }

    pub async fn existing_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        decode_list(self.api.get("bookings", &[]).await?)
    }

    /// Events on one of `dates` that no active booking already covers.
    pub async fn list_events_for_dates(
        &self,
        venue_id: u64,
        dates: &[NaiveDate],
        existing_bookings: &[Booking],
    ) -> Result<Vec<Event>, ApiError> {
        let targets = unbooked_dates(dates, existing_bookings);
        if targets.is_empty() {
            info!("There are no dates to book for");
            return Ok(vec![]);
        }

        let events = self.venue_events(venue_id).await?;
        Ok(filter_events(events, &targets))
    }
}

/// Drop every desired date that already has a non-cancelled booking on the same day.
pub fn unbooked_dates(dates: &[NaiveDate], bookings: &[Booking]) -> Vec<NaiveDate> {
    let mut targets = Vec::with_capacity(dates.len());
    for date in dates {
        let booked = bookings
            .iter()
            .filter(|booking| booking.is_active())
            .any(|booking| booking.day() == Some(*date));
        if booked {
            info!("{date} is already booked");
        } else if !targets.contains(date) {
            targets.push(*date);
        }
    }
    targets
}

pub fn filter_events(events: Vec<Event>, dates: &[NaiveDate]) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| match event.day() {
            Some(day) => dates.contains(&day),
            None => {
                warn!(event_id = %event.id, start_time = %event.start_time, "Unparseable event start time");
                false
            }
        })
        .collect()
}

/// Today before 10:00 local time, tomorrow from then on.
pub fn default_target_date(now: NaiveDateTime) -> NaiveDate {
    if now.hour() > 9 {
        now.date() + Duration::days(1)
    } else {
        now.date()
    }
}

fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Null => Ok(vec![]),
        value => serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string())),
    }
}
