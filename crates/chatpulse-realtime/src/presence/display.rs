//! Display states for an actor's presence.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discrete, human-facing presence state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayState {
    /// Online, or offline for less than the grace window.
    Online,
    /// Never seen.
    Offline,
    /// Seen less than a minute ago.
    LastSeenJustNow,
    /// Seen the given number of whole minutes ago.
    LastSeenMinutesAgo {
        /// Whole minutes elapsed.
        minutes: u32,
    },
    /// Seen the given number of whole hours ago.
    LastSeenHoursAgo {
        /// Whole hours elapsed.
        hours: u32,
    },
    /// Seen 24 to 48 hours ago.
    LastSeenYesterday,
    /// Seen the given number of whole days ago, below a week.
    LastSeenDaysAgo {
        /// Whole days elapsed.
        days: u32,
    },
    /// Seen on a calendar date a week or more ago.
    LastSeenOnDate {
        /// UTC date of the last sighting.
        date: NaiveDate,
        /// Whether the year differs from the current one.
        show_year: bool,
    },
}

impl DisplayState {
    /// Whether the actor should be shown as online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::LastSeenJustNow => write!(f, "last seen just now"),
            Self::LastSeenMinutesAgo { minutes: 1 } => write!(f, "last seen 1 minute ago"),
            Self::LastSeenMinutesAgo { minutes } => write!(f, "last seen {minutes} minutes ago"),
            Self::LastSeenHoursAgo { hours: 1 } => write!(f, "last seen 1 hour ago"),
            Self::LastSeenHoursAgo { hours } => write!(f, "last seen {hours} hours ago"),
            Self::LastSeenYesterday => write!(f, "last seen yesterday"),
            Self::LastSeenDaysAgo { days } => write!(f, "last seen {days} days ago"),
            Self::LastSeenOnDate {
                date,
                show_year: true,
            } => write!(f, "last seen on {}", date.format("%b %-d, %Y")),
            Self::LastSeenOnDate { date, .. } => {
                write!(f, "last seen on {}", date.format("%b %-d"))
            }
        }
    }
}
