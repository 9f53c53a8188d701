use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Wall-clock timestamp with a logical tie-breaker.
///
/// Ordering: `unix_ms` → `logical`. The logical counter lets a writer hand
/// out strictly increasing timestamps even when the wall clock stalls or
/// steps backwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since the UNIX epoch.
    pub unix_ms: u64,
    /// Logical counter for events within the same millisecond.
    pub logical: u32,
}

impl Timestamp {
    pub const fn new(unix_ms: u64, logical: u32) -> Self {
        Self { unix_ms, logical }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        let unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self { unix_ms, logical: 0 }
    }

    /// The current time, forced strictly after `previous`.
    ///
    /// When the logical counter is exhausted the timestamp moves on to the
    /// next millisecond.
    pub fn next_after(previous: &Self) -> Self {
        let now = Self::now();
        if now.unix_ms > previous.unix_ms {
            return now;
        }
        match previous.logical.checked_add(1) {
            Some(logical) => Self {
                unix_ms: previous.unix_ms,
                logical,
            },
            None => Self {
                unix_ms: previous.unix_ms.saturating_add(1),
                logical: 0,
            },
        }
    }

    /// RFC 3339 rendering (millisecond precision, UTC) for display.
    pub fn to_rfc3339(&self) -> String {
        match i64::try_from(self.unix_ms)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
        {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => format!("{}ms", self.unix_ms),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.unix_ms
            .cmp(&other.unix_ms)
            .then(self.logical.cmp(&other.logical))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms.{})", self.unix_ms, self.logical)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.logical == 0 {
            f.write_str(&self.to_rfc3339())
        } else {
            write!(f, "{}+{}", self.to_rfc3339(), self.logical)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ordering_physical_first() {
        assert!(Timestamp::new(100, 5) < Timestamp::new(200, 0));
        assert!(Timestamp::new(100, 1) < Timestamp::new(100, 2));
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        let ts = Timestamp::now();
        // after 2020-01-01
        assert!(ts.unix_ms > 1_577_836_800_000);
        assert_eq!(ts.logical, 0);
    }

    #[test]
    fn next_after_is_strictly_later() {
        let future = Timestamp::new(u64::MAX / 2, 3);
        let next = Timestamp::next_after(&future);
        assert_eq!(next, Timestamp::new(u64::MAX / 2, 4));

        let past = Timestamp::new(1, 0);
        assert!(Timestamp::next_after(&past) > past);
    }

    #[test]
    fn rfc3339_rendering() {
        let ts = Timestamp::new(1_700_000_000_123, 0);
        assert_eq!(ts.to_rfc3339(), "2023-11-14T22:13:20.123Z");
        assert_eq!(
            Timestamp::new(1_700_000_000_123, 2).to_string(),
            "2023-11-14T22:13:20.123Z+2"
        );
    }

    #[test]
    fn next_after_rolls_over_exhausted_counter() {
        let saturated = Timestamp::new(u64::MAX / 2, u32::MAX);
        let next = Timestamp::next_after(&saturated);
        assert!(next > saturated);
        assert_eq!(next, Timestamp::new(u64::MAX / 2 + 1, 0));
    }

    proptest! {
        #[test]
        fn next_after_never_goes_backwards(ms in 0u64..=u64::MAX / 2, logical in any::<u32>()) {
            let previous = Timestamp::new(ms, logical);
            prop_assert!(Timestamp::next_after(&previous) > previous);
        }
    }
}
