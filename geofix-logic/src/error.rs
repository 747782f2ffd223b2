use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Why a location request did not produce a reading
pub enum LocateError {
    /// The platform delivered an update carrying no readings
    #[error("the user can not be located")]
    CannotBeLocated,
    /// Another request was still pending when this one was started
    #[error("a location request is already in progress")]
    Busy,
    /// No reading arrived before the configured deadline, this is also how
    /// a denied or unanswered permission prompt eventually surfaces
    #[error("timed out waiting for a location")]
    TimedOut,
    /// The locator was shut down while the request was pending
    #[error("the location request was cancelled")]
    Cancelled,
}
