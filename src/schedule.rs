//! Views over the shift list: day buckets for "My Shift" and the per-area
//! listing for "Available Shift".
//!
//! Days are computed in the time zone of the `now` that is passed in.

use crate::types::Shift;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayLabel {
    Today,
    Tomorrow,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub label: DayLabel,
    pub title: String,
    pub shift_count: usize,
    pub total_hours: i64,
    pub shifts: Vec<T>,
}

impl<T: AsRef<Shift>> DayGroup<T> {
    fn new(date: NaiveDate, today: NaiveDate, mut shifts: Vec<T>) -> Self {
        shifts.sort_by_key(|item| item.as_ref().start_time);

        let label = if date == today {
            DayLabel::Today
        } else if Some(date) == today.succ_opt() {
            DayLabel::Tomorrow
        } else {
            DayLabel::Upcoming
        };
        let title = match label {
            DayLabel::Today => "Today".to_string(),
            DayLabel::Tomorrow => "Tomorrow".to_string(),
            DayLabel::Upcoming => date.format("%B %d").to_string(),
        };

        Self {
            date,
            label,
            title,
            shift_count: shifts.len(),
            total_hours: shifts.iter().map(|item| item.as_ref().whole_hours()).sum(),
            shifts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftStatus {
    /// Booked and not started, therefore cancellable.
    Booked,
    /// Started shifts can neither be booked nor cancelled, booked or not.
    Started,
    /// Collides with another booked shift.
    Overlapping,
    Bookable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftListing {
    pub shift: Shift,
    pub status: ShiftStatus,
}

impl AsRef<Shift> for ShiftListing {
    fn as_ref(&self) -> &Shift {
        &self.shift
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    pub area: String,
    pub shift_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableShifts {
    pub areas: Vec<AreaSummary>,
    pub selected_area: Option<String>,
    pub days: Vec<DayGroup<ShiftListing>>,
}

/// Buckets shifts by the local date they start on. Shifts starting on an
/// earlier day than today are dropped; anything dated today is kept even if it
/// already started.
pub fn group_by_day<T, Tz>(items: Vec<T>, now: &DateTime<Tz>) -> Vec<DayGroup<T>>
where
    T: AsRef<Shift>,
    Tz: TimeZone,
{
    bucket(items, now, false)
}

/// Booked shifts bucketed by day. Today and tomorrow are always present.
pub fn my_shifts<Tz: TimeZone>(shifts: &[Shift], now: &DateTime<Tz>) -> Vec<DayGroup<Shift>> {
    let booked: Vec<Shift> = shifts.iter().filter(|shift| shift.booked).cloned().collect();
    bucket(booked, now, true)
}

pub fn shift_status(shift: &Shift, shifts: &[Shift], now: DateTime<Utc>) -> ShiftStatus {
    if shift.has_started(now) {
        ShiftStatus::Started
    } else if shift.booked {
        ShiftStatus::Booked
    } else if shifts
        .iter()
        .any(|other| other.id != shift.id && other.booked && other.overlaps(shift))
    {
        ShiftStatus::Overlapping
    } else {
        ShiftStatus::Bookable
    }
}

/// Without a requested area the area of the first shift is selected.
pub fn available_shifts<Tz: TimeZone>(
    shifts: &[Shift],
    area: Option<&str>,
    now: &DateTime<Tz>,
) -> AvailableShifts {
    let mut areas: Vec<AreaSummary> = Vec::new();
    for shift in shifts {
        match areas.iter_mut().find(|summary| summary.area == shift.area) {
            Some(summary) => summary.shift_count += 1,
            None => areas.push(AreaSummary {
                area: shift.area.clone(),
                shift_count: 1,
            }),
        }
    }

    let selected_area = area
        .map(str::to_owned)
        .or_else(|| shifts.first().map(|shift| shift.area.clone()));

    let now_utc = now.with_timezone(&Utc);
    let days = match &selected_area {
        Some(selected) => {
            let listings: Vec<ShiftListing> = shifts
                .iter()
                .filter(|shift| &shift.area == selected)
                .map(|shift| ShiftListing {
                    shift: shift.clone(),
                    status: shift_status(shift, shifts, now_utc),
                })
                .collect();
            group_by_day(listings, now)
        }
        None => vec![],
    };

    AvailableShifts {
        areas,
        selected_area,
        days,
    }
}

fn bucket<T, Tz>(items: Vec<T>, now: &DateTime<Tz>, include_near_days: bool) -> Vec<DayGroup<T>>
where
    T: AsRef<Shift>,
    Tz: TimeZone,
{
    let timezone = now.timezone();
    let today = now.date_naive();

    let mut days: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
    if include_near_days {
        days.insert(today, vec![]);
        if let Some(tomorrow) = today.succ_opt() {
            days.insert(tomorrow, vec![]);
        }
    }

    for item in items {
        let date = item
            .as_ref()
            .start_time
            .with_timezone(&timezone)
            .date_naive();
        if date >= today {
            days.entry(date).or_default().push(item);
        }
    }

    days.into_iter()
        .map(|(date, shifts)| DayGroup::new(date, today, shifts))
        .collect()
}
