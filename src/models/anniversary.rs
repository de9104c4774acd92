use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A couple-scoped dated milestone, visible to both partners.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Anniversary {
    pub id: i32,
    pub created_by: i32,
    pub partner_id: i32,
    pub title: String,
    pub date: NaiveDate,
    pub repeats_yearly: bool,
    pub created_at: DateTime<Utc>,
}

impl Anniversary {
    /// The next occurrence on or after `today`. Non-repeating milestones
    /// keep their original date even once past.
    pub fn next_occurrence(&self, today: NaiveDate) -> NaiveDate {
        if !self.repeats_yearly || self.date >= today {
            return self.date;
        }

        let this_year = with_year(self.date, today.year());
        if this_year >= today {
            this_year
        } else {
            with_year(self.date, today.year() + 1)
        }
    }

    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.next_occurrence(today) - today).num_days()
    }
}

// Feb 29 anniversaries fall back to Feb 28 in non-leap years.
fn with_year(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anniversary(date: NaiveDate, repeats: bool) -> Anniversary {
        Anniversary {
            id: 1,
            created_by: 1,
            partner_id: 2,
            title: "first date".to_string(),
            date,
            repeats_yearly: repeats,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_upcoming_date_unchanged() {
        let a = anniversary(NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(), true);
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(a.next_occurrence(today), a.date);
    }

    #[test]
    fn test_past_repeating_rolls_to_next_year() {
        let a = anniversary(NaiveDate::from_ymd_opt(2020, 3, 14).unwrap(), true);
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(
            a.next_occurrence(today),
            NaiveDate::from_ymd_opt(2027, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_later_this_year() {
        let a = anniversary(NaiveDate::from_ymd_opt(2020, 11, 2).unwrap(), true);
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(
            a.next_occurrence(today),
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
        );
    }

    #[test]
    fn test_non_repeating_stays_past() {
        let a = anniversary(NaiveDate::from_ymd_opt(2020, 3, 14).unwrap(), false);
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(a.next_occurrence(today), a.date);
    }

    #[test]
    fn test_leap_day_in_common_year() {
        let a = anniversary(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(), true);
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(
            a.next_occurrence(today),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_days_until_today_is_zero() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let a = anniversary(today, true);
        assert_eq!(a.days_until(today), 0);
    }
}
