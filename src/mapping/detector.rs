//! Per-input change detection against the last effective values.

use std::collections::HashMap;
use tracing::trace;

use super::{deadzone, InputSample};

/// One detected input transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub key: String,
    pub previous: Option<i32>,
    pub value: i32,
}

/// Tracks the last effective value of every input key for one session.
///
/// The cache starts empty and is filled as changes are emitted. An input
/// that has never been seen compares equal to an effective value of 0, so a
/// controller at rest produces no output on its first report, while the
/// first nonzero report is a change with `previous = None`.
#[derive(Debug)]
pub struct ChangeDetector {
    cache: HashMap<String, i32>,
    deadzone_percent: u8,
}

impl ChangeDetector {
    pub fn new(deadzone_percent: u8) -> Self {
        Self {
            cache: HashMap::new(),
            deadzone_percent,
        }
    }

    /// Returns the keys whose effective value changed since the last call.
    ///
    /// The deadzone is re-applied to every raw sample before the comparison,
    /// so the cached baseline is always the previous *effective* value. Each
    /// cache entry is updated as its change is emitted, never before.
    pub fn process(&mut self, sample: &InputSample) -> Vec<Change> {
        let mut changes = Vec::new();
        for (key, &raw) in sample {
            let value = deadzone::apply(key, raw, self.deadzone_percent);
            let previous = self.cache.get(key).copied();
            if previous.unwrap_or(0) == value {
                continue;
            }

            trace!("{}: {:?} -> {}", key, previous, value);
            self.cache.insert(key.clone(), value);
            changes.push(Change {
                key: key.clone(),
                previous,
                value,
            });
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(entries: &[(&str, i32)]) -> InputSample {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn resting_controls_emit_nothing() {
        let mut detector = ChangeDetector::new(30);
        assert!(detector.process(&sample(&[("a", 0), ("b", 0)])).is_empty());
        assert!(detector.process(&sample(&[("a", 0)])).is_empty());
    }

    #[test]
    fn first_nonzero_report_is_a_change() {
        let mut detector = ChangeDetector::new(30);
        let changes = detector.process(&sample(&[("a", 1)]));
        assert_eq!(
            changes,
            vec![Change {
                key: "a".into(),
                previous: None,
                value: 1,
            }]
        );
    }

    #[test]
    fn press_then_release() {
        let mut detector = ChangeDetector::new(30);
        detector.process(&sample(&[("a", 1)]));
        let changes = detector.process(&sample(&[("a", 0)]));
        assert_eq!(
            changes,
            vec![Change {
                key: "a".into(),
                previous: Some(1),
                value: 0,
            }]
        );
    }

    #[test]
    fn repeated_value_is_idempotent() {
        let mut detector = ChangeDetector::new(30);
        assert_eq!(detector.process(&sample(&[("rtrigger", 100)])).len(), 1);
        assert!(detector.process(&sample(&[("rtrigger", 100)])).is_empty());
    }

    #[test]
    fn deadzone_suppressed_axis_is_not_a_change() {
        let mut detector = ChangeDetector::new(30);
        // 5000 * 2 / 65536 ≈ 0.15, inside a 30% deadzone
        assert!(detector.process(&sample(&[("rasX", 5000)])).is_empty());
        // wiggling inside the deadzone still compares equal to effective 0
        assert!(detector.process(&sample(&[("rasX", -4000)])).is_empty());
    }

    #[test]
    fn axis_crossing_the_deadzone_reports_effective_values() {
        let mut detector = ChangeDetector::new(30);
        let changes = detector.process(&sample(&[("rasX", 20000)]));
        assert_eq!(
            changes,
            vec![Change {
                key: "rasX".into(),
                previous: None,
                value: 20000,
            }]
        );
        // falling back inside the deadzone is a change to effective 0
        let changes = detector.process(&sample(&[("rasX", 5000)]));
        assert_eq!(
            changes,
            vec![Change {
                key: "rasX".into(),
                previous: Some(20000),
                value: 0,
            }]
        );
    }

    #[test]
    fn unrelated_keys_do_not_interfere() {
        let mut detector = ChangeDetector::new(30);
        detector.process(&sample(&[("a", 1)]));
        let changes = detector.process(&sample(&[("a", 1), ("b", 1)]));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, "b");
    }
}
