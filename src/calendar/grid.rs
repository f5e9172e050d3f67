use crate::options::FirstWeekday;
use std::iter::successors;
use time::{Date, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// One cell of the month grid.  `in_month` is false for the leading and
/// trailing days that belong to the adjacent months.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    pub date: Date,
    pub in_month: bool,
}

/// The week rows covering one displayed month: consecutive, each exactly
/// seven days, the first column being the configured first weekday.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    year: i32,
    month: Month,
    weeks: Vec<[DayCell; DAYS_IN_WEEK]>,
}

impl MonthGrid {
    /// Compute the grid of the month containing `anchor`
    pub(crate) fn of(anchor: Date, first_weekday: FirstWeekday) -> MonthGrid {
        let year = anchor.year();
        let month = anchor.month();
        let first_of_month = anchor.replace_day(1).expect("day 1 is valid in any month");
        let last_of_month = first_of_month
            .replace_day(month.length(year))
            .expect("month length is a valid day");
        let mut start = first_of_month;
        for _ in 0..weekday_column(first_of_month.weekday(), first_weekday) {
            match start.previous_day() {
                Some(d) => start = d,
                None => break,
            }
        }
        let mut dates = successors(Some(start), |&d| d.next_day());
        let mut weeks = Vec::with_capacity(6);
        'collect: loop {
            let mut week = [DayCell {
                date: first_of_month,
                in_month: false,
            }; DAYS_IN_WEEK];
            for slot in &mut week {
                let Some(d) = dates.next() else {
                    break 'collect;
                };
                *slot = DayCell {
                    date: d,
                    in_month: d.year() == year && d.month() == month,
                };
            }
            let done = week[DAYS_IN_WEEK - 1].date >= last_of_month;
            weeks.push(week);
            if done {
                break;
            }
        }
        MonthGrid { year, month, weeks }
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn weeks(&self) -> &[[DayCell; DAYS_IN_WEEK]] {
        &self.weeks
    }

    /// ISO 8601 week number of a row, read off the row's Thursday so the
    /// answer does not depend on which weekday starts the row
    pub(crate) fn week_number(&self, row: usize) -> u8 {
        self.weeks[row]
            .iter()
            .find(|cell| cell.date.weekday() == Weekday::Thursday)
            .expect("a full week contains a Thursday")
            .date
            .iso_week()
    }
}

/// Column (0-6) a weekday lands in under the given first-weekday layout
pub(crate) fn weekday_column(weekday: Weekday, first_weekday: FirstWeekday) -> u8 {
    match first_weekday {
        FirstWeekday::Monday => weekday.number_days_from_monday(),
        FirstWeekday::Sunday => weekday.number_days_from_sunday(),
    }
}

/// The month after (year, month), `None` past the representable range
pub(crate) fn next_month(year: i32, month: Month) -> Option<(i32, Month)> {
    let (year, month) = match month {
        Month::December => (year.checked_add(1)?, Month::January),
        m => (year, m.next()),
    };
    Date::from_calendar_date(year, month, 1).ok()?;
    Some((year, month))
}

/// The month before (year, month), `None` past the representable range
pub(crate) fn prev_month(year: i32, month: Month) -> Option<(i32, Month)> {
    let (year, month) = match month {
        Month::January => (year.checked_sub(1)?, Month::December),
        m => (year, m.previous()),
    };
    Date::from_calendar_date(year, month, 1).ok()?;
    Some((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_november_2023_monday_first() {
        let grid = MonthGrid::of(date!(2023 - 11 - 16), FirstWeekday::Monday);
        assert_eq!(grid.year(), 2023);
        assert_eq!(grid.month(), Month::November);
        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0].date, date!(2023 - 10 - 30));
        assert!(!weeks[0][0].in_month);
        assert_eq!(weeks[0][2].date, date!(2023 - 11 - 01));
        assert!(weeks[0][2].in_month);
        assert_eq!(weeks[4][6].date, date!(2023 - 12 - 03));
        assert!(!weeks[4][6].in_month);
        let in_month = weeks.iter().flatten().filter(|cell| cell.in_month).count();
        assert_eq!(in_month, 30);
    }

    #[test]
    fn test_november_2023_sunday_first() {
        let grid = MonthGrid::of(date!(2023 - 11 - 16), FirstWeekday::Sunday);
        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0].date, date!(2023 - 10 - 29));
        assert_eq!(weeks[0][0].date.weekday(), Weekday::Sunday);
        assert_eq!(weeks[4][6].date, date!(2023 - 12 - 02));
    }

    #[test]
    fn test_weeks_are_consecutive_full_rows() {
        let grid = MonthGrid::of(date!(2024 - 02 - 29), FirstWeekday::Monday);
        let mut expected = grid.weeks()[0][0].date;
        for week in grid.weeks() {
            assert_eq!(week[0].date.weekday(), Weekday::Monday);
            for cell in week {
                assert_eq!(cell.date, expected);
                expected = expected.next_day().unwrap();
            }
        }
    }

    #[test]
    fn test_six_week_month() {
        // May 2021 under a Monday-first layout runs from Mon Apr 26
        // through Sun Jun 6
        let grid = MonthGrid::of(date!(2021 - 05 - 01), FirstWeekday::Monday);
        assert_eq!(grid.weeks().len(), 6);
        assert_eq!(grid.weeks()[0][0].date, date!(2021 - 04 - 26));
        assert_eq!(grid.weeks()[5][6].date, date!(2021 - 06 - 06));
    }

    #[test]
    fn test_four_week_month() {
        // February 2021 starts on a Monday and has exactly 28 days
        let grid = MonthGrid::of(date!(2021 - 02 - 14), FirstWeekday::Monday);
        assert_eq!(grid.weeks().len(), 4);
        assert!(grid.weeks().iter().flatten().all(|cell| cell.in_month));
    }

    #[test]
    fn test_week_numbers_are_iso() {
        let grid = MonthGrid::of(date!(2021 - 01 - 01), FirstWeekday::Monday);
        // Jan 1 2021 is a Friday; its ISO week is week 53 of 2020
        assert_eq!(grid.week_number(0), 53);
        assert_eq!(grid.week_number(1), 1);
        let sunday_first = MonthGrid::of(date!(2021 - 01 - 01), FirstWeekday::Sunday);
        // the Thursday rule keeps the column identical for both layouts
        assert_eq!(sunday_first.week_number(0), 53);
    }

    #[test]
    fn test_month_stepping() {
        assert_eq!(next_month(2020, Month::January), Some((2020, Month::February)));
        assert_eq!(next_month(2020, Month::December), Some((2021, Month::January)));
        assert_eq!(prev_month(2020, Month::January), Some((2019, Month::December)));
        assert_eq!(prev_month(2020, Month::March), Some((2020, Month::February)));
        assert_eq!(next_month(9999, Month::December), None);
        assert_eq!(prev_month(-9999, Month::January), None);
    }
}
