mod error;
mod location;
mod locator;
mod settings;
mod source;
mod view;

pub use error::LocateError;
pub use location::{AuthorizationState, Coordinate, Location, UtcDT};
pub use locator::Locator;
pub use settings::LocateSettings;
pub use source::{LocationSource, SourceEvent};
pub use view::{LocationView, UpdateSender};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
