use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::Duration,
};

use log::error;
use tokio::{
    sync::{Mutex, mpsc},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use geofix_logic::{
    AuthorizationState, LocateSettings, Location, LocationSource, SourceEvent, prelude::*,
};

use crate::endpoint;

type QueuePair<T> = (mpsc::Sender<T>, Mutex<mpsc::Receiver<T>>);
type Queue = QueuePair<SourceEvent>;

const QUEUE_DEPTH: usize = 8;

/// How the permission prompt gets answered. A headless process has no
/// system dialog, the decision comes from configuration instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentPolicy {
    Grant,
    Deny,
}

/// [LocationSource] backed by an IP positioning service over HTTP.
///
/// A fix that is fresher than the configured maximum age is served from
/// cache instead of going back to the network.
pub struct HttpLocationSource {
    policy: ConsentPolicy,
    authorization: StdMutex<AuthorizationState>,
    incoming: Queue,
    client: reqwest::Client,
    maximum_age: Duration,
    last_fix: Arc<Mutex<Option<(Instant, Location)>>>,
    stop: Mutex<CancellationToken>,
}

impl HttpLocationSource {
    pub fn new(policy: ConsentPolicy, settings: &LocateSettings) -> Result<Self> {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let client = reqwest::Client::builder()
            .build()
            .context("Could not build the HTTP client")?;

        Ok(Self {
            policy,
            authorization: StdMutex::new(AuthorizationState::NotDetermined),
            incoming: (tx, Mutex::new(rx)),
            client,
            maximum_age: settings.maximum_age(),
            last_fix: Arc::new(Mutex::new(None)),
            stop: Mutex::new(CancellationToken::new()),
        })
    }

    async fn push_event(&self, event: SourceEvent) {
        self.incoming.0.send(event).await.ok();
    }

    async fn cached_fix(&self) -> Option<Location> {
        let guard = self.last_fix.lock().await;
        match guard.as_ref() {
            Some((at, location)) if at.elapsed() <= self.maximum_age => Some(*location),
            _ => None,
        }
    }
}

impl LocationSource for HttpLocationSource {
    fn is_authorized(&self) -> bool {
        self.authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authorized()
    }

    async fn request_authorization(&self) {
        let answer = {
            let mut state = self
                .authorization
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // The prompt settles the state once, a repeat request re-reports
            // the earlier answer instead of asking again
            if *state == AuthorizationState::NotDetermined {
                *state = match self.policy {
                    ConsentPolicy::Grant => AuthorizationState::Authorized,
                    ConsentPolicy::Deny => AuthorizationState::Denied,
                };
            }
            *state
        };

        self.push_event(SourceEvent::AuthorizationChanged(answer))
            .await;
    }

    async fn start_updates(&self) {
        if let Some(location) = self.cached_fix().await {
            self.push_event(SourceEvent::LocationsUpdated(vec![location]))
                .await;
            return;
        }

        let stop = {
            let mut guard = self.stop.lock().await;
            *guard = CancellationToken::new();
            guard.clone()
        };
        let client = self.client.clone();
        let tx = self.incoming.0.clone();
        let last_fix = self.last_fix.clone();

        tokio::spawn(async move {
            let batch = tokio::select! {
                _ = stop.cancelled() => return,

                res = endpoint::fetch_position(&client) => match res {
                    Ok(Some(location)) => {
                        *last_fix.lock().await = Some((Instant::now(), location));
                        vec![location]
                    }
                    // The service answered but could not place us
                    Ok(None) => Vec::new(),
                    Err(why) => {
                        error!("Failed to fetch a position: {why:?}");
                        Vec::new()
                    }
                },
            };

            tx.send(SourceEvent::LocationsUpdated(batch)).await.ok();
        });
    }

    async fn stop_updates(&self) {
        self.stop.lock().await.cancel();
    }

    async fn receive_events(&self) -> impl Iterator<Item = SourceEvent> {
        let mut rx = self.incoming.1.lock().await;
        let mut buf = Vec::with_capacity(QUEUE_DEPTH);
        rx.recv_many(&mut buf, QUEUE_DEPTH).await;
        buf.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::test;

    fn mk_source(policy: ConsentPolicy) -> HttpLocationSource {
        HttpLocationSource::new(policy, &LocateSettings::default())
            .expect("Failed to build source")
    }

    async fn next_event(source: &HttpLocationSource) -> SourceEvent {
        source
            .receive_events()
            .await
            .next()
            .expect("No event queued")
    }

    #[test]
    async fn test_grant_policy_authorizes() {
        let source = mk_source(ConsentPolicy::Grant);
        assert!(!source.is_authorized());

        source.request_authorization().await;

        assert!(source.is_authorized());
        let event = next_event(&source).await;
        assert!(matches!(
            event,
            SourceEvent::AuthorizationChanged(AuthorizationState::Authorized)
        ));
    }

    #[test]
    async fn test_deny_policy_settles_denied() {
        let source = mk_source(ConsentPolicy::Deny);

        source.request_authorization().await;
        assert!(!source.is_authorized());
        let event = next_event(&source).await;
        assert!(matches!(
            event,
            SourceEvent::AuthorizationChanged(AuthorizationState::Denied)
        ));

        // A second prompt re-reports the settled answer, it does not flip it
        source.request_authorization().await;
        let event = next_event(&source).await;
        assert!(matches!(
            event,
            SourceEvent::AuthorizationChanged(AuthorizationState::Denied)
        ));
    }

    #[test]
    async fn test_fresh_fix_served_from_cache() {
        let source = mk_source(ConsentPolicy::Grant);
        let fix = Location::new(geofix_logic::Coordinate::new(51.509865, -0.118092));
        *source.last_fix.lock().await = Some((Instant::now(), fix));

        source.start_updates().await;

        let event = next_event(&source).await;
        match event {
            SourceEvent::LocationsUpdated(batch) => {
                assert_eq!(batch.last().map(|l| l.coordinate), Some(fix.coordinate));
            }
            other => panic!("Unexpected event: {other:?}"),
        }
    }
}
