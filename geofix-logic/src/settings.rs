use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Settings for a location request
pub struct LocateSettings {
    /// Seconds to wait for a reading before the request fails, covers the
    /// permission prompt as well as the fix itself
    pub timeout_seconds: u32,
    /// A cached fix older than this many milliseconds is considered stale
    /// and will not be served in place of a fresh one
    pub maximum_age_ms: u32,
}

impl LocateSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms.into())
    }
}

impl Default for LocateSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            maximum_age_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let settings = LocateSettings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.maximum_age(), Duration::from_millis(2000));
    }
}
