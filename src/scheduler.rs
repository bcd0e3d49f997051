// Poll loop that keeps trying to book every pending event.
// A single worker walks the queue head to tail; the poll interval sleep
// blocks it, so every other pending event waits the same amount.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    booking::BookingAttempt, models::Event, quotes::QuoteFetcher, work_queue::WorkQueue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Booked,
    NoAvailability,
    AttemptFailed,
}

pub struct RetryScheduler {
    queue: Arc<WorkQueue<Event>>,
    quotes: QuoteFetcher,
    booking: BookingAttempt,
    poll_interval: Duration,
}

impl RetryScheduler {
    pub fn new(
        queue: Arc<WorkQueue<Event>>,
        quotes: QuoteFetcher,
        booking: BookingAttempt,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            quotes,
            booking,
            poll_interval,
        }
    }

    pub fn queue(&self) -> Arc<WorkQueue<Event>> {
        self.queue.clone()
    }

    /// One fetch-and-book cycle for `event`.
    pub async fn process(&self, event: &Event) -> Outcome {
        info!(event_id = %event.id, "Fetching quotes for {}...", event.start_time);

        let available: Vec<_> = self
            .quotes
            .fetch(&event.id)
            .await
            .into_iter()
            .filter(|quote| quote.has_options())
            .collect();

        if available.is_empty() {
            info!(
                event_id = %event.id,
                "No spaces for {}, sleeping for {} seconds...",
                event.start_time,
                self.poll_interval.as_secs_f64()
            );
            return Outcome::NoAvailability;
        }

        info!(event_id = %event.id, "Found quotes for {}", event.start_time);
        if self.booking.attempt(&available).await {
            Outcome::Booked
        } else {
            warn!(event_id = %event.id, "Could not book {}", event.start_time);
            Outcome::AttemptFailed
        }
    }

    // Drain the queue, returning how many events were booked.
    // An event is retried until booked or the task is dropped.
    pub async fn run(self) -> usize {
        let mut booked = 0;

        while let Some(event) = self.queue.front() {
            match self.process(&event).await {
                Outcome::Booked => {
                    self.queue.complete_front();
                    booked += 1;
                }
                Outcome::NoAvailability | Outcome::AttemptFailed => {
                    tokio::time::sleep(self.poll_interval).await;
                    self.queue.requeue_front();
                }
            }
        }

        booked
    }

    pub fn spawn(self) -> JoinHandle<usize> {
        tokio::spawn(self.run())
    }
}
