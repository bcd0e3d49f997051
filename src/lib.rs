// Parking reservation bot for a recurring venue event

pub mod api;
pub mod app;
pub mod auth;
pub mod booking;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod quotes;
pub mod scheduler;
pub mod work_queue;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use api::{ApiClient, ParkingApiClient};
pub use app::{run, Booker, RunOutcome};
pub use auth::AuthSession;
pub use booking::BookingAttempt;
pub use config::{BookerConfig, ClientConfig, Login};
pub use discovery::EventDiscovery;
pub use error::{ApiError, AuthError};
pub use models::{Booking, Credential, Event, PurchaseOption, Quote};
pub use quotes::QuoteFetcher;
pub use scheduler::{Outcome, RetryScheduler};
pub use work_queue::{QueueKey, WorkQueue};
