use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub service_id: String,
    pub business_id: String,
    pub date: NaiveDate,
    /// `HH:MM`, 24-hour local time.
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn interval(&self) -> Result<TimeInterval, CoreError> {
        TimeInterval::parse(&self.start_time, &self.end_time)
    }

    pub fn starts_at(&self) -> Result<NaiveDateTime, CoreError> {
        Ok(self.date.and_time(parse_slot_time(&self.start_time)?))
    }

    pub fn ends_at(&self) -> Result<NaiveDateTime, CoreError> {
        Ok(self.date.and_time(parse_slot_time(&self.end_time)?))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open `[start, end)` interval within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        let start_time = parse_slot_time(start)?;
        let end_time = parse_slot_time(end)?;
        if end_time <= start_time {
            return Err(CoreError::MalformedTimeSlot(format!(
                "end {end} is not after start {start}"
            )));
        }
        Ok(Self {
            start: start_time,
            end: end_time,
        })
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Parses a strict `HH:MM` 24-hour string.
pub fn parse_slot_time(s: &str) -> Result<NaiveTime, CoreError> {
    let malformed = || CoreError::MalformedTimeSlot(format!("invalid time: {s:?}"));

    let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;
    if hour.len() != 2 || minute.len() != 2 {
        return Err(malformed());
    }
    let hour: u32 = hour.parse().map_err(|_| malformed())?;
    let minute: u32 = minute.parse().map_err(|_| malformed())?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_time() {
        assert_eq!(
            parse_slot_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_slot_time("24:00").is_err());
        assert!(parse_slot_time("9:30").is_err());
        assert!(parse_slot_time("09-30").is_err());
        assert!(parse_slot_time("ab:cd").is_err());
    }

    #[test]
    fn test_interval_requires_end_after_start() {
        assert!(TimeInterval::parse("10:00", "11:00").is_ok());
        assert!(matches!(
            TimeInterval::parse("11:00", "11:00"),
            Err(CoreError::MalformedTimeSlot(_))
        ));
        assert!(TimeInterval::parse("12:00", "11:00").is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = TimeInterval::parse("10:00", "11:00").unwrap();
        let b = TimeInterval::parse("10:30", "11:30").unwrap();
        let c = TimeInterval::parse("11:00", "12:00").unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        assert!(BookingStatus::Completed.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }
}
