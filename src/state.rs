use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Sales already announced by this process, keyed by `SaleEvent::dedup_key`.
///
/// Only used in watch mode. Entries expire after `retention`, which must cover
/// the lookback window or overlapping polls will re-announce.
pub struct SeenSales {
    announced_at: HashMap<String, DateTime<Utc>>,
    retention: Duration,
}

impl SeenSales {
    pub fn new(retention: Duration) -> Self {
        Self {
            announced_at: HashMap::new(),
            retention,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.announced_at.contains_key(key)
    }

    /// Record a sale as announced. Returns `false` if it was already known.
    pub fn insert(&mut self, key: String, at: DateTime<Utc>) -> bool {
        self.announced_at.insert(key, at).is_none()
    }

    /// Drop entries older than the retention window. Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.announced_at.len();
        let cutoff = now - self.retention;
        self.announced_at.retain(|_, at| *at >= cutoff);
        before - self.announced_at.len()
    }

    pub fn len(&self) -> usize {
        self.announced_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.announced_at.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, min, 0).unwrap()
    }

    #[test]
    fn insert_reports_new_keys_only() {
        let mut seen = SeenSales::new(Duration::minutes(10));
        assert!(seen.is_empty());
        assert!(seen.insert("0xa".into(), t(0)));
        assert!(!seen.insert("0xa".into(), t(1)));
        assert!(seen.contains("0xa"));
        assert!(!seen.contains("0xb"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn prune_drops_expired_entries() {
        let mut seen = SeenSales::new(Duration::minutes(10));
        seen.insert("old".into(), t(0));
        seen.insert("new".into(), t(8));
        assert_eq!(seen.prune(t(12)), 1);
        assert!(!seen.contains("old"));
        assert!(seen.contains("new"));
    }

    #[test]
    fn prune_keeps_entries_at_cutoff() {
        let mut seen = SeenSales::new(Duration::minutes(10));
        seen.insert("edge".into(), t(0));
        assert_eq!(seen.prune(t(10)), 0);
        assert_eq!(seen.len(), 1);
    }
}
