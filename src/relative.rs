//! Relative time offsets such as `"-2 seconds"` or `"-1 hour -30 minutes"`.
//!
//! The new-message window and the autoremove age are configured this way.
//! An offset is applied to "now" to obtain the cutoff instant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::error::FileMailerError;

/// A signed offset parsed from a human-readable string.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativeTime {
    source: String,
    offset: Duration,
}

impl RelativeTime {
    /// The offset as a signed duration.
    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// The instant `now + offset`, clamped to the representable range.
    pub fn apply(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.offset).unwrap_or(if self.offset < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }
}

impl FromStr for RelativeTime {
    type Err = FileMailerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FileMailerError::InvalidRelativeTime(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        if trimmed.eq_ignore_ascii_case("now") {
            return Ok(Self {
                source: trimmed.to_string(),
                offset: Duration::zero(),
            });
        }

        let mut offset = Duration::zero();
        let mut tokens = trimmed.split_whitespace();
        while let Some(amount) = tokens.next() {
            // "-2 seconds" and "-2seconds" are both accepted
            let (number, unit) = match amount.find(|c: char| c.is_ascii_alphabetic()) {
                Some(pos) => (&amount[..pos], amount[pos..].to_string()),
                None => (amount, tokens.next().ok_or_else(invalid)?.to_string()),
            };
            let value: i64 = number
                .strip_prefix('+')
                .unwrap_or(number)
                .parse()
                .map_err(|_| invalid())?;
            let step = unit_duration(&unit).ok_or_else(invalid)?;
            let factor = i32::try_from(value).map_err(|_| invalid())?;
            offset = step
                .checked_mul(factor)
                .and_then(|delta| offset.checked_add(&delta))
                .ok_or_else(invalid)?;
        }

        Ok(Self {
            source: trimmed.to_string(),
            offset,
        })
    }
}

/// Length of one unit, accepting singular, plural and short forms.
fn unit_duration(unit: &str) -> Option<Duration> {
    match unit.to_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(Duration::seconds(1)),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(Duration::minutes(1)),
        "h" | "hour" | "hours" => Some(Duration::hours(1)),
        "d" | "day" | "days" => Some(Duration::days(1)),
        "w" | "week" | "weeks" => Some(Duration::weeks(1)),
        _ => None,
    }
}

impl TryFrom<String> for RelativeTime {
    type Error = FileMailerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelativeTime> for String {
    fn from(value: RelativeTime) -> Self {
        value.source
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
