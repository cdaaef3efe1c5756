use std::time::Instant;

use chrono::{FixedOffset, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

/// Holds no tally results; every read goes to the database.
#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub clock: Clock,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: DatabaseConnection, clock: Clock) -> Self {
        Self {
            database,
            clock,
            start_time: Instant::now(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

/// Source of the calendar date that votes are recorded and tallied against.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Wall clock shifted into the office's time zone.
    System(FixedOffset),
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System(offset) => Utc::now().with_timezone(offset).date_naive(),
            Self::Fixed(date) => *date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        assert_eq!(Clock::Fixed(date).today(), date);
    }

    #[test]
    fn system_clock_honours_offset() {
        let east = FixedOffset::east_opt(14 * 3_600).unwrap();
        let west = FixedOffset::west_opt(12 * 3_600).unwrap();
        let ahead = Clock::System(east).today();
        let behind = Clock::System(west).today();
        let gap = ahead.signed_duration_since(behind).num_days();
        assert!((1..=2).contains(&gap), "offsets 26h apart span one or two days, got {gap}");
    }
}
