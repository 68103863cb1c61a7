use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub area: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub booked: bool,
}

impl Shift {
    /// Times are kept at millisecond precision, the resolution of the wire format.
    pub fn new(area: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            area: area.into(),
            start_time: start_time.trunc_subsecs(3),
            end_time: end_time.trunc_subsecs(3),
            booked: false,
        }
    }

    /// Half-open intersection: back-to-back shifts do not overlap.
    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    pub fn whole_hours(&self) -> i64 {
        (self.end_time - self.start_time).num_hours()
    }
}

impl AsRef<Shift> for Shift {
    fn as_ref(&self) -> &Shift {
        self
    }
}
