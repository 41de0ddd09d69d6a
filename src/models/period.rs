use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use super::YearMonth;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Calendar date (UTC) of an epoch-millis timestamp.
pub fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Epoch millis at the start (00:00 UTC) of `date`.
pub fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// A reporting window, resolved to an inclusive epoch-millis range.
/// All boundaries are UTC days; weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    ThisWeek,
    Month(YearMonth),
    Year(i32),
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn current_month() -> Self {
        let today = Utc::now().date_naive();
        Self::Month(YearMonth {
            year: today.year(),
            month: today.month(),
        })
    }

    pub fn range(&self) -> Option<(i64, i64)> {
        self.range_at(Utc::now().date_naive())
    }

    /// Range relative to `today`; `None` if a bound falls outside the
    /// representable calendar.
    pub fn range_at(&self, today: NaiveDate) -> Option<(i64, i64)> {
        let (first, last) = match *self {
            Self::Today => (today, today),
            Self::ThisWeek => {
                let back = Days::new(u64::from(today.weekday().num_days_from_monday()));
                let monday = today.checked_sub_days(back)?;
                (monday, monday.checked_add_days(Days::new(6))?)
            }
            Self::Month(ym) => {
                let first = NaiveDate::from_ymd_opt(ym.year, ym.month, 1)?;
                let next = if ym.month == 12 {
                    NaiveDate::from_ymd_opt(ym.year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(ym.year, ym.month + 1, 1)?
                };
                (first, next.pred_opt()?)
            }
            Self::Year(year) => (
                NaiveDate::from_ymd_opt(year, 1, 1)?,
                NaiveDate::from_ymd_opt(year, 12, 31)?,
            ),
            Self::Custom { start, end } => (start.min(end), start.max(end)),
        };
        Some((date_to_millis(first), end_of_day_millis(last)?))
    }
}

fn end_of_day_millis(date: NaiveDate) -> Option<i64> {
    let next = date.succ_opt()?;
    Some(date_to_millis(next) - 1)
}
