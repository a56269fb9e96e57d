// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;

const MILLIS_PER_DAY: i64 = 86_400_000;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Thresholds for stepping from one label unit to the next: seconds to
/// minutes, minutes to hours, hours to days, days to months, months to years.
const LABEL_STEPS: [f64; 5] = [60.0, 60.0, 24.0, 31.0, 12.0];

pub const DEFAULT_LABEL_UNITS: [&str; 6] = ["second", "min", "hour", "day", "month", "year"];

/// A UTC instant with millisecond precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(3))
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// The current instant.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn from_unix_millis(millis: i64) -> Fallible<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| {
                ErrorReport::new(
                    ErrorKind::InvalidParameter,
                    format!("timestamp out of range: {millis}"),
                )
            })
    }

    pub fn unix_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Saturates at the representable range.
    pub fn add_days(self, days: i64) -> Self {
        self.add_delta(Duration::try_days(days), days < 0)
    }

    /// Saturates at the representable range.
    pub fn add_minutes(self, minutes: i64) -> Self {
        self.add_delta(Duration::try_minutes(minutes), minutes < 0)
    }

    fn add_delta(self, delta: Option<Duration>, negative: bool) -> Self {
        match delta.and_then(|delta| self.0.checked_add_signed(delta)) {
            Some(dt) => Self(dt),
            None if negative => Self::new(DateTime::<Utc>::MIN_UTC),
            None => Self::new(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whole days from `earlier` to `self`, rounded towards negative infinity.
    pub fn days_since(self, earlier: Timestamp) -> i64 {
        (self.unix_millis() - earlier.unix_millis()).div_euclid(MILLIS_PER_DAY)
    }

    /// Renders the gap between `since` and `self` in the largest unit that
    /// keeps the value below the next step, e.g. `"10min"` or `"4day"`.
    ///
    /// With `detailed` false only the number is returned. A custom set of
    /// unit labels is used when exactly six are given.
    pub fn interval_label(self, since: Timestamp, detailed: bool, units: &[&str]) -> String {
        let units: &[&str] = if units.len() == DEFAULT_LABEL_UNITS.len() {
            units
        } else {
            &DEFAULT_LABEL_UNITS
        };
        let mut diff = (self.unix_millis() - since.unix_millis()) as f64 / 1000.0;
        let mut i = LABEL_STEPS.len();
        for (index, step) in LABEL_STEPS.iter().enumerate() {
            if diff < *step {
                i = index;
                break;
            }
            diff /= step;
        }
        let value = diff.floor() as i64;
        if detailed {
            format!("{value}{}", units[i])
        } else {
            value.to_string()
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let dt = DateTime::parse_from_rfc3339(&value).map_err(|_| {
            ErrorReport::new(
                ErrorKind::InvalidParameter,
                format!("Failed to parse timestamp: '{value}'."),
            )
        })?;
        Ok(Timestamp::new(dt.with_timezone(&Utc)))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}
