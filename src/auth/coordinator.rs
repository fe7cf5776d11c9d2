// Single-flight coordination for credential refresh
//
// The first request to see a 401 while nothing is refreshing becomes the
// leader and performs the refresh. Every later 401 joins the wave as a
// follower and parks on a oneshot slot until the leader settles.

use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};

type Waiter = oneshot::Sender<Result<String>>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,

    /// Followers in the order they joined the wave
    waiters: Vec<Waiter>,
}

/// Refresh state owned by one client instance
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Role handed out by [`RefreshCoordinator::join`]
pub enum Ticket<'a> {
    /// Caller must perform the refresh and settle the flight
    Leader(RefreshFlight<'a>),

    /// Caller waits for the leader's outcome
    Follower(oneshot::Receiver<Result<String>>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Join the current refresh wave, starting one if none is in flight
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.state();

        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            tracing::debug!(
                queued = state.waiters.len(),
                "Refresh in flight, queueing request"
            );
            return Ticket::Follower(rx);
        }

        state.in_flight = true;
        Ticket::Leader(RefreshFlight {
            coordinator: self,
            settled: false,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        self.state().in_flight
    }

    /// Number of requests parked behind the in-flight refresh
    pub fn queued(&self) -> usize {
        self.state().waiters.len()
    }

    /// Clear the flag and resolve every follower in join order
    fn settle(&self, outcome: &Result<String>) {
        let waiters = {
            let mut state = self.state();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        if !waiters.is_empty() {
            tracing::debug!(
                count = waiters.len(),
                success = outcome.is_ok(),
                "Resolving queued requests"
            );
        }

        for waiter in waiters {
            // A follower that was dropped no longer cares
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Leader's handle on the in-flight refresh
///
/// Dropping it without calling [`RefreshFlight::settle`] fails the wave with
/// a `Network` error and leaves the stored session untouched.
pub struct RefreshFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshFlight<'_> {
    pub fn settle(mut self, outcome: &Result<String>) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for RefreshFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Token refresh abandoned before completion");
            self.coordinator.settle(&Err(abandoned()));
        }
    }
}

/// Outcome handed to followers when the leader never finished
pub(crate) fn abandoned() -> ClientError {
    ClientError::Network("token refresh was abandoned".to_string())
}
