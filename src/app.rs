// Startup flow: login, read existing bookings, discover events, drain the queue

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::{
    api::{ApiClient, ParkingApiClient},
    auth::{http_client, AuthSession},
    booking::BookingAttempt,
    config::BookerConfig,
    discovery::{default_target_date, EventDiscovery},
    error::{ApiError, AuthError},
    models::Event,
    quotes::QuoteFetcher,
    scheduler::RetryScheduler,
    work_queue::WorkQueue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery found nothing to book, so the worker never started.
    NothingToBook,
    Completed { booked: usize },
}

pub struct Booker {
    config: BookerConfig,
    api: Arc<dyn ApiClient>,
}

/// Log in and build a client around the fresh session.
pub async fn login(config: BookerConfig) -> Result<Booker, AuthError> {
    let http = http_client(&config.client).map_err(|e| AuthError::Network(e.to_string()))?;
    let session = Arc::new(AuthSession::new(
        http.clone(),
        &config.client,
        config.login.clone(),
    ));
    session.refresh().await?;

    let api = ParkingApiClient::new(http, config.client.clone(), session);
    Ok(Booker::with_api(config, Arc::new(api)))
}

pub async fn run(config: BookerConfig) -> Result<RunOutcome> {
    let booker = login(config).await.context("Login failed")?;
    booker.book_all(Local::now().naive_local()).await
}

impl Booker {
    pub fn with_api(config: BookerConfig, api: Arc<dyn ApiClient>) -> Self {
        Self { config, api }
    }

    pub fn target_dates(&self, now: NaiveDateTime) -> Vec<NaiveDate> {
        if self.config.dates.is_empty() {
            vec![default_target_date(now)]
        } else {
            self.config.dates.clone()
        }
    }

    pub async fn discover(&self, now: NaiveDateTime) -> Result<Vec<Event>, ApiError> {
        let discovery = EventDiscovery::new(self.api.clone(), self.config.client.page_size);
        let bookings = discovery.existing_bookings().await?;
        discovery
            .list_events_for_dates(
                self.config.client.venue_id,
                &self.target_dates(now),
                &bookings,
            )
            .await
    }

    pub fn scheduler(&self, events: Vec<Event>) -> RetryScheduler {
        let email = self.config.login.email.clone();
        let queue = Arc::new(events.into_iter().collect::<WorkQueue<_>>());
        let quotes = QuoteFetcher::new(self.api.clone(), email.clone());
        let booking = BookingAttempt::new(
            self.api.clone(),
            email,
            self.config.plate_number.clone(),
            self.config.dry_run,
        );
        RetryScheduler::new(queue, quotes, booking, self.config.poll_interval)
    }

    pub async fn book_all(&self, now: NaiveDateTime) -> Result<RunOutcome> {
        let events = self
            .discover(now)
            .await
            .context("Failed to discover events")?;
        if events.is_empty() {
            info!("No matching events to book");
            return Ok(RunOutcome::NothingToBook);
        }

        let scheduler = self.scheduler(events);
        info!(count = scheduler.queue().len(), "Queued events for booking");
        let booked = scheduler
            .spawn()
            .await
            .context("Booking worker stopped unexpectedly")?;
        info!(booked, "All events booked");
        Ok(RunOutcome::Completed { booked })
    }
}
