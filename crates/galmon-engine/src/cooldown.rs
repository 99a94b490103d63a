use chrono::{DateTime, Duration, Utc};
use galmon_common::types::AlertKind;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-(host, rule kind) record of the last firing time.
///
/// Entries are created on first firing and never expire; the map is
/// bounded by node count times rule kind count.
pub struct CooldownTracker {
    last_fired: Mutex<HashMap<(String, AlertKind), DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self {
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true when the (host, kind) pair may fire: either it has
    /// never fired, or at least `cooldown_secs` have elapsed since the
    /// last firing. A true return records `now` as the new last firing
    /// time in the same locked section, so two near-simultaneous
    /// evaluations cannot both pass.
    pub fn try_fire(
        &self,
        host: &str,
        kind: AlertKind,
        now: DateTime<Utc>,
        cooldown_secs: u64,
    ) -> bool {
        let mut last_fired = self
            .last_fired
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let key = (host.to_string(), kind);
        let suppressed = last_fired
            .get(&key)
            .is_some_and(|last| now - *last < Duration::seconds(cooldown_secs as i64));

        if suppressed {
            return false;
        }
        last_fired.insert(key, now);
        true
    }
}
