//! Relative-age labels and recency windows.

use chrono::{DateTime, TimeDelta, Utc};
use safety_map_report_models::EffectiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A recency window selectable in the map filters.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum WindowKind {
    /// No recency restriction
    #[default]
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
    /// The last hour
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    LastHour,
    /// The last 24 hours
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    Last24Hours,
    /// The last 7 days
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Last7Days,
    /// The last 30 days
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Last30Days,
}

impl WindowKind {
    /// Returns the length of the window, or `None` for [`Self::All`].
    #[must_use]
    pub const fn duration(self) -> Option<TimeDelta> {
        match self {
            Self::All => None,
            Self::LastHour => Some(TimeDelta::hours(1)),
            Self::Last24Hours => Some(TimeDelta::hours(24)),
            Self::Last7Days => Some(TimeDelta::days(7)),
            Self::Last30Days => Some(TimeDelta::days(30)),
        }
    }

    /// Returns the earliest instant still inside the window.
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now - d)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::All,
            Self::LastHour,
            Self::Last24Hours,
            Self::Last7Days,
            Self::Last30Days,
        ]
    }
}

/// Returns `true` if a report with the given effective time belongs in
/// `window`.
///
/// [`WindowKind::All`] accepts everything. Any other window rejects
/// reports whose time is [`EffectiveTime::Unknown`], since there is
/// nothing to compare against the cutoff.
#[must_use]
pub fn within_window(effective: EffectiveTime, window: WindowKind, now: DateTime<Utc>) -> bool {
    let Some(cutoff) = window.cutoff(now) else {
        return true;
    };

    effective.instant().is_some_and(|t| t >= cutoff)
}

/// Coarse "how long ago" bucket for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    /// Less than a minute ago (or in the future).
    JustNow,
    /// Whole minutes, `1..60`.
    Minutes(i64),
    /// Whole hours, `1..24`.
    Hours(i64),
    /// Whole days, `1..7`.
    Days(i64),
    /// Whole weeks, `1..`.
    Weeks(i64),
    /// No usable time was available.
    Recently,
}

impl std::fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::JustNow => f.write_str("Just now"),
            Self::Minutes(n) => write!(f, "{n} min{} ago", plural(n)),
            Self::Hours(n) => write!(f, "{n} hour{} ago", plural(n)),
            Self::Days(n) => write!(f, "{n} day{} ago", plural(n)),
            Self::Weeks(n) => write!(f, "{n} week{} ago", plural(n)),
            Self::Recently => f.write_str("Recently"),
        }
    }
}

const fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Buckets the time elapsed since `effective` into a [`RelativeAge`].
#[must_use]
pub fn classify(effective: EffectiveTime, now: DateTime<Utc>) -> RelativeAge {
    effective
        .instant()
        .map_or(RelativeAge::Recently, |t| classify_elapsed(now - t))
}

/// Buckets an elapsed duration. Negative durations count as "just now".
#[must_use]
pub fn classify_elapsed(elapsed: TimeDelta) -> RelativeAge {
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return RelativeAge::JustNow;
    }
    if minutes < 60 {
        return RelativeAge::Minutes(minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return RelativeAge::Hours(hours);
    }

    let days = hours / 24;
    if days < 7 {
        return RelativeAge::Days(days);
    }

    RelativeAge::Weeks(days / 7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> EffectiveTime {
        EffectiveTime::Server(now() - delta)
    }

    #[test]
    fn labels_each_bucket() {
        let cases = [
            (TimeDelta::zero(), "Just now"),
            (TimeDelta::seconds(59), "Just now"),
            (TimeDelta::minutes(1), "1 min ago"),
            (TimeDelta::minutes(2), "2 mins ago"),
            (TimeDelta::minutes(59), "59 mins ago"),
            (TimeDelta::minutes(60), "1 hour ago"),
            (TimeDelta::hours(5), "5 hours ago"),
            (TimeDelta::hours(24), "1 day ago"),
            (TimeDelta::days(6), "6 days ago"),
            (TimeDelta::days(7), "1 week ago"),
            (TimeDelta::days(30), "4 weeks ago"),
        ];

        for (delta, expected) in cases {
            assert_eq!(classify(ago(delta), now()).to_string(), expected, "{delta}");
        }
    }

    #[test]
    fn unknown_time_is_recently() {
        assert_eq!(
            classify(EffectiveTime::Unknown, now()),
            RelativeAge::Recently
        );
        assert_eq!(RelativeAge::Recently.to_string(), "Recently");
    }

    #[test]
    fn future_time_is_just_now() {
        assert_eq!(
            classify(EffectiveTime::Server(now() + TimeDelta::hours(2)), now()),
            RelativeAge::JustNow
        );
    }

    #[test]
    fn all_window_accepts_everything() {
        assert!(within_window(
            EffectiveTime::Unknown,
            WindowKind::All,
            now()
        ));
        assert!(within_window(
            ago(TimeDelta::days(400)),
            WindowKind::All,
            now()
        ));
    }

    #[test]
    fn windows_compare_against_cutoff() {
        assert!(within_window(
            ago(TimeDelta::minutes(30)),
            WindowKind::LastHour,
            now()
        ));
        assert!(within_window(
            ago(TimeDelta::hours(1)),
            WindowKind::LastHour,
            now()
        ));
        assert!(!within_window(
            ago(TimeDelta::minutes(61)),
            WindowKind::LastHour,
            now()
        ));
        assert!(within_window(
            ago(TimeDelta::hours(2)),
            WindowKind::Last24Hours,
            now()
        ));
        assert!(!within_window(
            ago(TimeDelta::days(10)),
            WindowKind::Last7Days,
            now()
        ));
        assert!(within_window(
            ago(TimeDelta::days(10)),
            WindowKind::Last30Days,
            now()
        ));
    }

    #[test]
    fn unknown_time_is_excluded_from_windows() {
        for window in WindowKind::all().iter().skip(1) {
            assert!(!within_window(EffectiveTime::Unknown, *window, now()));
        }
    }

    #[test]
    fn parses_window_names() {
        assert_eq!(
            "24h".parse::<WindowKind>().unwrap(),
            WindowKind::Last24Hours
        );
        assert_eq!("all".parse::<WindowKind>().unwrap(), WindowKind::All);
        assert!("2w".parse::<WindowKind>().is_err());
        assert_eq!(WindowKind::Last7Days.to_string(), "7d");
    }
}
