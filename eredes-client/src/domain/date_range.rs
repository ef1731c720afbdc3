use time::{Date, Duration, OffsetDateTime};

/// Inclusive window of calendar days sent as `fechaInicio`/`fechaFin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// The full calendar month containing `today - 30 days`.
    pub fn previous_month(today: Date) -> Self {
        let anchor = today - Duration::days(30);
        let start = anchor - Duration::days(i64::from(anchor.day()) - 1);
        Self {
            start,
            end: last_day_of_month(start),
        }
    }

    /// Previous-month window relative to the local date.
    ///
    /// Falls back to the UTC date when the local offset cannot be determined.
    pub fn previous_month_from_now() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "local offset unavailable, using UTC date");
            OffsetDateTime::now_utc()
        });
        Self::previous_month(now.date())
    }

    pub fn start_label(&self) -> String {
        format_label(self.start)
    }

    pub fn end_label(&self) -> String {
        format_label(self.end)
    }

    /// `consumo-DD_MM_YYYY-DD_MM_YYYY.json`
    pub fn file_name(&self) -> String {
        format!(
            "consumo-{}-{}.json",
            self.start_label().replace('/', "_"),
            self.end_label().replace('/', "_")
        )
    }
}

/// `DD/MM/YYYY`, the form the API expects for dates.
fn format_label(date: Date) -> String {
    format!("{:02}/{:02}/{:04}", date.day(), u8::from(date.month()), date.year())
}

/// Last calendar day of the month `any_day` falls in.
///
/// Day 28 exists in every month and day 28 + 4 always lands in the next
/// month, so stepping back by that date's day-of-month gives the answer.
pub fn last_day_of_month(any_day: Date) -> Date {
    let day_28 = any_day - Duration::days(i64::from(any_day.day()) - 28);
    let next_month = day_28 + Duration::days(4);
    next_month - Duration::days(i64::from(next_month.day()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::Month;

    #[test]
    fn last_day_of_month_rolls_into_next_month() {
        for year in [2023, 2024, 2100] {
            for month in 1..=12u8 {
                let month = Month::try_from(month).unwrap();
                let first = Date::from_calendar_date(year, month, 1).unwrap();
                let last = last_day_of_month(first);

                assert_eq!(last.month(), month);
                let next = last + Duration::days(1);
                assert_eq!(next.day(), 1);
                assert_eq!(next.month(), month.next());
            }
        }
    }

    #[test]
    fn last_day_of_month_handles_leap_years() {
        assert_eq!(last_day_of_month(date!(2024 - 02 - 10)), date!(2024 - 02 - 29));
        assert_eq!(last_day_of_month(date!(2023 - 02 - 10)), date!(2023 - 02 - 28));
        assert_eq!(last_day_of_month(date!(2100 - 02 - 01)), date!(2100 - 02 - 28));
        assert_eq!(last_day_of_month(date!(2000 - 02 - 01)), date!(2000 - 02 - 29));
    }

    #[test]
    fn last_day_of_month_is_idempotent() {
        let last = last_day_of_month(date!(2024 - 04 - 17));
        let first = last - Duration::days(i64::from(last.day()) - 1);
        assert_eq!(last_day_of_month(first), last);
        assert_eq!(last_day_of_month(last), last);
    }

    #[test]
    fn previous_month_covers_whole_month() {
        let range = DateRange::previous_month(date!(2024 - 04 - 15));
        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 03 - 31));

        let range = DateRange::previous_month(date!(2024 - 01 - 05));
        assert_eq!(range.start, date!(2023 - 12 - 01));
        assert_eq!(range.end, date!(2023 - 12 - 31));
    }

    #[test]
    fn previous_month_uses_thirty_day_anchor() {
        // 31 March minus 30 days is still in March.
        let range = DateRange::previous_month(date!(2024 - 03 - 31));
        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 03 - 31));
    }

    #[test]
    fn previous_month_always_starts_on_day_one() {
        let mut today = date!(2023 - 01 - 01);
        while today < date!(2025 - 01 - 01) {
            let range = DateRange::previous_month(today);
            assert_eq!(range.start.day(), 1);
            assert_eq!(range.end, last_day_of_month(range.start));
            today += Duration::days(1);
        }
    }

    #[test]
    fn labels_and_file_name() {
        let range = DateRange::new(date!(2024 - 03 - 01), date!(2024 - 03 - 31));
        assert_eq!(range.start_label(), "01/03/2024");
        assert_eq!(range.end_label(), "31/03/2024");
        assert_eq!(range.file_name(), "consumo-01_03_2024-31_03_2024.json");
    }
}
