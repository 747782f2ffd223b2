use crate::location::{AuthorizationState, Location};

#[derive(Debug, Clone)]
/// Inbound message from the platform location subsystem
pub enum SourceEvent {
    /// The permission state changed, either from the user answering the
    /// prompt or from a settings change while a request is pending
    AuthorizationChanged(AuthorizationState),
    /// A batch of location updates was produced, possibly empty.
    /// The most recent reading is last.
    LocationsUpdated(Vec<Location>),
}

pub trait LocationSource: Send + Sync {
    /// Current platform permission state, no side effects
    fn is_authorized(&self) -> bool;
    /// Trigger the permission prompt. The answer arrives as an
    /// [SourceEvent::AuthorizationChanged] event, never as a return value.
    fn request_authorization(&self) -> impl Future<Output = ()> + Send;
    /// Begin producing location updates, delivered via
    /// [SourceEvent::LocationsUpdated] events. Failures surface as an
    /// update carrying no readings.
    fn start_updates(&self) -> impl Future<Output = ()> + Send;
    /// Stop producing location updates
    fn stop_updates(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
    /// Receive pending events, at most one consumer at a time
    fn receive_events(&self) -> impl Future<Output = impl Iterator<Item = SourceEvent>> + Send;
}
