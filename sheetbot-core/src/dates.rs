use std::str::FromStr;

use time::{Date, Duration, Month, OffsetDateTime};

use crate::error::ReportError;

/// Inclusive span of calendar days; `start <= end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn single(day: Date) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.next_day().filter(|next| *next <= end)
        })
    }
}

/// Canned ranges ending yesterday.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodPreset {
    Week,
    Month,
    All,
}

impl PeriodPreset {
    pub fn range(self, yesterday: Date, available_from: Date) -> DateRange {
        let start = match self {
            PeriodPreset::Week => yesterday.checked_sub(Duration::days(6)),
            PeriodPreset::Month => yesterday.replace_day(1).ok(),
            PeriodPreset::All => Some(available_from),
        };
        start
            .and_then(|s| DateRange::new(s, yesterday))
            .unwrap_or(DateRange::single(yesterday))
    }
}

impl FromStr for PeriodPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(PeriodPreset::Week),
            "month" => Ok(PeriodPreset::Month),
            "all" => Ok(PeriodPreset::All),
            other => Err(format!("unknown period preset {other:?}")),
        }
    }
}

/// Header spelling of a date: `dd.mm.yy`.
pub fn header_label(date: Date) -> String {
    format!(
        "{:02}.{:02}.{:02}",
        date.day(),
        u8::from(date.month()),
        date.year().rem_euclid(100)
    )
}

/// User-facing spelling of a date: `dd.mm.yyyy`.
pub fn display_date(date: Date) -> String {
    format!(
        "{:02}.{:02}.{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

pub fn yesterday_of(now: OffsetDateTime) -> Date {
    let today = now.date();
    today.previous_day().unwrap_or(today)
}

/// `DD.MM.YYYY`, or `DD.MM` in `current_year`.
pub fn parse_user_date(text: &str, current_year: i32) -> Result<Date, ReportError> {
    parse_day(text, current_year).ok_or_else(|| ReportError::InvalidDateFormat(text.to_string()))
}

/// `DD.MM-DD.MM`, either side optionally carrying `.YYYY`.
pub fn parse_user_range(text: &str, current_year: i32) -> Result<DateRange, ReportError> {
    let invalid = || ReportError::InvalidRangeFormat(text.to_string());
    let (start, end) = text.split_once('-').ok_or_else(invalid)?;
    if end.contains('-') {
        return Err(invalid());
    }
    let start = parse_day(start, current_year).ok_or_else(invalid)?;
    let end = parse_day(end, current_year).ok_or_else(invalid)?;
    DateRange::new(start, end).ok_or_else(invalid)
}

fn parse_day(text: &str, current_year: i32) -> Option<Date> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    let (day, month, year) = match parts.as_slice() {
        [d, m] => (*d, *m, None),
        [d, m, y] => (*d, *m, Some(*y)),
        _ => return None,
    };
    let day: u8 = small_number(day, 2)?.try_into().ok()?;
    let month: u8 = small_number(month, 2)?.try_into().ok()?;
    let year = match year {
        Some(y) if y.len() == 4 => i32::try_from(small_number(y, 4)?).ok()?,
        Some(_) => return None,
        None => current_year,
    };
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn small_number(s: &str, max_digits: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max_digits || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::{date, datetime};

    #[test]
    fn labels_use_two_and_four_digit_years() {
        assert_eq!(header_label(date!(2024 - 11 - 01)), "01.11.24");
        assert_eq!(header_label(date!(2000 - 01 - 09)), "09.01.00");
        assert_eq!(display_date(date!(2024 - 11 - 01)), "01.11.2024");
    }

    #[test]
    fn range_iterates_inclusively() {
        let r = DateRange::new(date!(2024 - 10 - 30), date!(2024 - 11 - 02)).unwrap();
        let days: Vec<Date> = r.days().collect();
        assert_eq!(
            days,
            vec![
                date!(2024 - 10 - 30),
                date!(2024 - 10 - 31),
                date!(2024 - 11 - 01),
                date!(2024 - 11 - 02),
            ]
        );
        assert_eq!(DateRange::single(date!(2024 - 11 - 01)).days().count(), 1);
        assert!(DateRange::new(date!(2024 - 11 - 02), date!(2024 - 11 - 01)).is_none());
    }

    #[test]
    fn user_dates_fill_in_current_year() {
        assert_eq!(parse_user_date("01.11", 2024), Ok(date!(2024 - 11 - 01)));
        assert_eq!(parse_user_date(" 1.11.2023 ", 2024), Ok(date!(2023 - 11 - 01)));
        for bad in ["", "01", "32.01", "01.13.2024", "01.11.24", "a.b", "01.11.2024.1"] {
            assert_eq!(
                parse_user_date(bad, 2024),
                Err(ReportError::InvalidDateFormat(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn user_ranges() {
        let r = parse_user_range("14.10-20.10", 2024).unwrap();
        assert_eq!((r.start(), r.end()), (date!(2024 - 10 - 14), date!(2024 - 10 - 20)));

        let r = parse_user_range("25.12.2024-05.01.2025", 2024).unwrap();
        assert_eq!(r.days().count(), 12);

        for bad in ["14.10", "14.10-20.10-21.10", "20.10-14.10", "x-y"] {
            assert_eq!(
                parse_user_range(bad, 2024),
                Err(ReportError::InvalidRangeFormat(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn presets_end_yesterday() {
        let y = date!(2024 - 11 - 20);
        let from = date!(2024 - 10 - 14);
        let week = PeriodPreset::Week.range(y, from);
        assert_eq!((week.start(), week.end()), (date!(2024 - 11 - 14), y));
        let month = PeriodPreset::Month.range(y, from);
        assert_eq!(month.start(), date!(2024 - 11 - 01));
        assert_eq!(PeriodPreset::All.range(y, from).start(), from);
        // data starting after yesterday collapses to a single day
        assert_eq!(PeriodPreset::All.range(from, y), DateRange::single(from));
    }

    #[test]
    fn yesterday_crosses_month_boundary() {
        assert_eq!(
            yesterday_of(datetime!(2024-11-01 09:00 +3)),
            date!(2024 - 10 - 31)
        );
    }
}
