use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::{parse_slot_time, Booking, BookingStatus, TimeInterval};

/// Rows shown by the week view: 8 AM up to the 7 PM row.
pub const DISPLAY_HOURS: Range<u32> = 8..20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub hour: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Some(WeekStart::Sunday),
            "monday" | "mon" => Some(WeekStart::Monday),
            _ => None,
        }
    }
}

pub fn start_of_week(anchor: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => anchor.weekday().num_days_from_sunday(),
        WeekStart::Monday => anchor.weekday().num_days_from_monday(),
    };
    anchor - Duration::days(i64::from(offset))
}

/// Groups bookings by date and start hour. A booking spanning several hours
/// appears only under the hour it starts in.
pub fn index_by_date_hour(
    bookings: &[Booking],
) -> Result<BTreeMap<SlotKey, Vec<&Booking>>, CoreError> {
    let mut index: BTreeMap<SlotKey, Vec<&Booking>> = BTreeMap::new();
    for booking in bookings {
        let start = parse_slot_time(&booking.start_time)?;
        let key = SlotKey {
            date: booking.date,
            hour: start.hour(),
        };
        index.entry(key).or_default().push(booking);
    }
    Ok(index)
}

pub fn bookings_for_week(
    bookings: &[Booking],
    anchor: NaiveDate,
    week_start: WeekStart,
) -> Vec<&Booking> {
    let first = start_of_week(anchor, week_start);
    let last = first + Duration::days(6);
    bookings
        .iter()
        .filter(|b| b.date >= first && b.date <= last)
        .collect()
}

/// Bookings on `date`, ascending by start time.
pub fn bookings_for_date(bookings: &[Booking], date: NaiveDate) -> Result<Vec<&Booking>, CoreError> {
    let mut keyed = Vec::new();
    for booking in bookings.iter().filter(|b| b.date == date) {
        keyed.push((parse_slot_time(&booking.start_time)?, booking));
    }
    keyed.sort_by_key(|(start, _)| *start);
    Ok(keyed.into_iter().map(|(_, b)| b).collect())
}

/// Rejects `interval` when it overlaps a non-cancelled booking of the same
/// business on the same day. Touching intervals do not conflict.
pub fn check_slot_conflict(
    business_id: &str,
    date: NaiveDate,
    interval: &TimeInterval,
    existing: &[Booking],
) -> Result<(), CoreError> {
    for booking in existing {
        if booking.business_id != business_id
            || booking.date != date
            || booking.status == BookingStatus::Cancelled
        {
            continue;
        }
        if booking.interval()?.overlaps(interval) {
            return Err(CoreError::SlotConflict {
                booking_id: booking.id.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WeekGrid<'a> {
    pub days: Vec<NaiveDate>,
    pub hours: Vec<u32>,
    pub cells: Vec<GridCell<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GridCell<'a> {
    pub date: NaiveDate,
    pub hour: u32,
    pub bookings: Vec<&'a Booking>,
}

/// Builds the week view around `anchor`. Only occupied cells are listed.
pub fn week_grid<'a>(
    bookings: &'a [Booking],
    anchor: NaiveDate,
    week_start: WeekStart,
) -> Result<WeekGrid<'a>, CoreError> {
    let first = start_of_week(anchor, week_start);
    let days: Vec<NaiveDate> = (0..7).map(|d| first + Duration::days(d)).collect();
    let index = index_by_date_hour(bookings)?;

    let mut cells = Vec::new();
    for day in &days {
        for hour in DISPLAY_HOURS {
            let key = SlotKey { date: *day, hour };
            if let Some(in_cell) = index.get(&key) {
                cells.push(GridCell {
                    date: *day,
                    hour,
                    bookings: in_cell.clone(),
                });
            }
        }
    }

    Ok(WeekGrid {
        days,
        hours: DISPLAY_HOURS.collect(),
        cells,
    })
}
