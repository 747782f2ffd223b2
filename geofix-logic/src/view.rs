use std::sync::Arc;

use chrono::Utc;
use log::warn;

use crate::{
    location::{Location, UtcDT},
    locator::Locator,
    source::LocationSource,
};

/// Seam for telling the UI layer that the view state changed
pub trait UpdateSender {
    fn send_update(&self);
}

/// Presentation-layer state: the last place the user was successfully
/// located, absent until a request resolves.
pub struct LocationView<S: LocationSource, U: UpdateSender> {
    locator: Arc<Locator<S>>,
    updates: U,
    last_location: Option<Location>,
    located_at: Option<UtcDT>,
}

impl<S: LocationSource, U: UpdateSender> LocationView<S, U> {
    pub fn new(locator: Arc<Locator<S>>, updates: U) -> Self {
        Self {
            locator,
            updates,
            last_location: None,
            located_at: None,
        }
    }

    /// Run one location request and keep the outcome. A failure is logged
    /// and leaves the previously stored reading untouched.
    pub async fn activate(&mut self) {
        match self.locator.locate().await {
            Ok(location) => {
                self.last_location = Some(location);
                self.located_at = Some(Utc::now());
                self.updates.send_update();
            }
            Err(why) => {
                warn!("Could not determine the user's location: {why}");
            }
        }
    }

    pub fn last_location(&self) -> Option<Location> {
        self.last_location
    }

    /// When [Self::last_location] was obtained
    pub fn located_at(&self) -> Option<UtcDT> {
        self.located_at
    }
}
