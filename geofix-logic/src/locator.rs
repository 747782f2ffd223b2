use std::sync::Arc;

use log::debug;
use tokio::{sync::Mutex, time::Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::LocateError,
    location::Location,
    settings::LocateSettings,
    source::{LocationSource, SourceEvent},
};

/// Coordinates one "find the user" request against a [LocationSource],
/// driving the authorization-then-update sequence and resolving each
/// request with a reading or a [LocateError].
pub struct Locator<S: LocationSource> {
    source: Arc<S>,
    settings: LocateSettings,
    /// Held for the whole lifetime of a request, a second caller is
    /// rejected with [LocateError::Busy] instead of silently replacing the
    /// pending one
    in_flight: Mutex<()>,
    cancel: CancellationToken,
}

impl<S: LocationSource> Locator<S> {
    pub fn new(source: Arc<S>, settings: LocateSettings) -> Self {
        Self {
            source,
            settings,
            in_flight: Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    /// Whether a request is currently awaiting a result
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Abort the pending request, if any. The locator is retired
    /// afterwards, later calls to [Self::locate] resolve with
    /// [LocateError::Cancelled] immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolve the user's current position. Resolves exactly once per
    /// call: with the freshest reading the source delivers, or with an
    /// error once the source answers empty, the deadline passes, or the
    /// locator is cancelled.
    pub async fn locate(&self) -> Result<Location, LocateError> {
        let Ok(_pending) = self.in_flight.try_lock() else {
            return Err(LocateError::Busy);
        };

        let request = Uuid::new_v4();
        let deadline = Instant::now() + self.settings.timeout();

        if self.source.is_authorized() {
            debug!("Request {request}: starting location updates");
            self.source.start_updates().await;
        } else {
            debug!("Request {request}: asking for location permission");
            self.source.request_authorization().await;
        }

        let res = 'find: loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break Err(LocateError::Cancelled);
                }

                _ = tokio::time::sleep_until(deadline) => {
                    break Err(LocateError::TimedOut);
                }

                events = self.source.receive_events() => {
                    for event in events {
                        if let Some(res) = self.consume_event(event).await {
                            break 'find res;
                        }
                    }
                }
            }
        };

        self.source.stop_updates().await;

        match &res {
            Ok(location) => debug!("Request {request}: located at {}", location.coordinate),
            Err(why) => debug!("Request {request}: failed: {why}"),
        }

        res
    }

    async fn consume_event(&self, event: SourceEvent) -> Option<Result<Location, LocateError>> {
        match event {
            SourceEvent::AuthorizationChanged(state) => {
                if state.is_authorized() {
                    self.source.start_updates().await;
                }
                // Any other answer leaves the request pending, the user can
                // still grant permission from the system settings. The
                // deadline is the safety net.
                None
            }
            SourceEvent::LocationsUpdated(batch) => {
                // Most recent reading wins
                Some(batch.last().copied().ok_or(LocateError::CannotBeLocated))
            }
        }
    }
}
