//! Millisecond timestamps as carried in storefront payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(pub i64);

impl Millis {
    /// Convert to a UTC datetime, `None` when out of chrono's range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<DateTime<Utc>> for Millis {
    fn from(dt: DateTime<Utc>) -> Self {
        Millis(dt.timestamp_millis())
    }
}

impl From<i64> for Millis {
    fn from(ms: i64) -> Self {
        Millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_millis_to_datetime() {
        let ms = Millis(1698148900000);
        let dt = ms.to_datetime().unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 10, 24, 12, 1, 40).unwrap());
        assert_eq!(Millis::from(dt), ms);
    }

    #[test]
    fn test_millis_out_of_range() {
        assert!(Millis(i64::MAX).to_datetime().is_none());
    }
}
