//! Presence resolution: `(online, last_seen, now)` → [`DisplayState`].

use std::time::Duration;

use chrono::{DateTime, Datelike, TimeDelta, Utc};

use chatpulse_core::config::presence::PresenceConfig;
use chatpulse_core::types::presence::PresenceRecord;

use super::display::DisplayState;

/// Default window during which an offline actor is still shown online.
pub const DEFAULT_ONLINE_GRACE: Duration = Duration::from_secs(30);

/// Pure presence resolver.
///
/// Holds no timer: callers re-evaluate on their own tick so relative
/// states ("5 minutes ago") stay current.
#[derive(Debug, Clone, Copy)]
pub struct PresenceResolver {
    grace: TimeDelta,
}

impl PresenceResolver {
    /// Create a resolver with a custom online grace window.
    pub fn new(grace: Duration) -> Self {
        Self {
            grace: TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &PresenceConfig) -> Self {
        Self::new(config.online_grace())
    }

    /// Resolve the display state of one actor at `now`.
    ///
    /// A `last_seen` later than `now` (clock skew between writers) counts as
    /// zero elapsed time.
    pub fn resolve(
        &self,
        online: bool,
        last_seen: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DisplayState {
        if online {
            return DisplayState::Online;
        }
        let Some(last_seen) = last_seen else {
            return DisplayState::Offline;
        };

        let elapsed = (now - last_seen).max(TimeDelta::zero());

        if elapsed < self.grace {
            DisplayState::Online
        } else if elapsed < TimeDelta::minutes(1) {
            DisplayState::LastSeenJustNow
        } else if elapsed < TimeDelta::minutes(2) {
            DisplayState::LastSeenMinutesAgo { minutes: 1 }
        } else if elapsed < TimeDelta::hours(1) {
            DisplayState::LastSeenMinutesAgo {
                minutes: whole(elapsed.num_minutes()),
            }
        } else if elapsed < TimeDelta::hours(2) {
            DisplayState::LastSeenHoursAgo { hours: 1 }
        } else if elapsed < TimeDelta::hours(24) {
            DisplayState::LastSeenHoursAgo {
                hours: whole(elapsed.num_hours()),
            }
        } else if elapsed < TimeDelta::hours(48) {
            DisplayState::LastSeenYesterday
        } else if elapsed < TimeDelta::days(7) {
            DisplayState::LastSeenDaysAgo {
                days: whole(elapsed.num_days()),
            }
        } else {
            let date = last_seen.date_naive();
            DisplayState::LastSeenOnDate {
                date,
                show_year: date.year() != now.year(),
            }
        }
    }

    /// Resolve a stored record at `now`.
    pub fn resolve_record(&self, record: &PresenceRecord, now: DateTime<Utc>) -> DisplayState {
        self.resolve(record.online, record.last_seen, now)
    }
}

impl Default for PresenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ONLINE_GRACE)
    }
}

/// [`PresenceResolver::resolve`] with the default 30 second grace window.
pub fn resolve(online: bool, last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DisplayState {
    PresenceResolver::default().resolve(online, last_seen, now)
}

fn whole(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
