use crate::{error::FixtureError, types::Shift};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use std::path::Path;
use tokio::fs;

const NUMBER_OF_DAYS: u64 = 5;

/// Local start and end hour of every example shift, per area.
const EXAMPLE_AREAS: [(&str, &[(u32, u32)]); 3] = [
    ("Helsinki", &[(8, 12), (12, 16), (17, 22)]),
    ("Tampere", &[(9, 13), (14, 18)]),
    ("Turku", &[(7, 11), (16, 20)]),
];

/// (day offset, area, start hour) of the shifts that start out booked.
const EXAMPLE_BOOKINGS: [(u64, &str, u32); 2] = [(1, "Helsinki", 12), (2, "Turku", 7)];

/// Example shifts for today and the following days, laid out in the local
/// calendar of `now`.
pub fn example_shifts(now: DateTime<FixedOffset>) -> Vec<Shift> {
    let offset = *now.offset();
    let today = now.date_naive();

    let mut shifts = Vec::new();
    for day in 0..NUMBER_OF_DAYS {
        let Some(date) = today.checked_add_days(Days::new(day)) else {
            break;
        };
        for (area, hours) in EXAMPLE_AREAS {
            for &(start_hour, end_hour) in hours {
                let (Some(start_time), Some(end_time)) = (
                    local_time(date, start_hour, offset),
                    local_time(date, end_hour, offset),
                ) else {
                    continue;
                };
                let mut shift = Shift::new(area, start_time, end_time);
                shift.booked = EXAMPLE_BOOKINGS.contains(&(day, area, start_hour));
                shifts.push(shift);
            }
        }
    }
    shifts
}

fn local_time(date: NaiveDate, hour: u32, offset: FixedOffset) -> Option<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0)?
        .and_local_timezone(offset)
        .single()
        .map(|datetime| datetime.with_timezone(&Utc))
}

pub async fn load_shifts_file(path: &Path) -> Result<Vec<Shift>, FixtureError> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
