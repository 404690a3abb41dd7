//! Month generation: the ordered sequence of [`CalendarMonth`]s covering the
//! configured bounds, each broken into fixed-width-7 week rows.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::CalendarOptions;

/// Number of columns in the day grid.
pub const DAYS_PER_WEEK: usize = 7;

/// First day of the week in the day grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// The weekday shown in the leftmost grid column.
    pub fn first_weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// Grid column (0..=6) of `weekday` under this week start.
    pub fn column_of(self, weekday: Weekday) -> usize {
        match self {
            Self::Sunday => weekday.num_days_from_sunday() as usize,
            Self::Monday => weekday.num_days_from_monday() as usize,
        }
    }
}

/// One grid cell: a real day, or `None` for leading/trailing padding.
pub type CalendarDay = Option<NaiveDate>;

/// One generated month, immutable once generated.
///
/// Regenerated wholesale whenever bounds, buffer or week-start settings change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CalendarMonth {
    /// First day of the month.
    pub first_day: NaiveDate,
    pub year: i32,
    /// 1..=12.
    pub month: u32,
    /// Display name, e.g. "January".
    pub name: String,
    /// Abbreviated display name, e.g. "Jan".
    pub short_name: String,
    /// Header title, e.g. "January 2025".
    pub title: String,
    /// Day cells in grid order. Length is always a multiple of 7.
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    pub(crate) fn generate(year: i32, month: u32, options: &CalendarOptions) -> Self {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap_or_else(|| panic!("invalid month: {year}-{month}"));

        let leading = options.week_start.column_of(first_day.weekday());
        let num_days = last_day_of_month(first_day);

        let mut days: Vec<CalendarDay> = Vec::with_capacity(leading + num_days as usize);
        days.resize(leading, None);
        for day in 1..=num_days {
            days.push(NaiveDate::from_ymd_opt(year, month, day));
        }
        while days.len() % DAYS_PER_WEEK != 0 {
            days.push(None);
        }

        let (name, short_name) = display_names(first_day, options);
        let title = format!("{name} {year}");

        Self {
            first_day,
            year,
            month,
            name,
            short_name,
            title,
            days,
        }
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .with_day(last_day_of_month(self.first_day))
            .expect("last day of month is always valid")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The week rows of the day grid, each exactly 7 cells wide.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(DAYS_PER_WEEK)
    }

    pub fn num_weeks(&self) -> usize {
        self.days.len() / DAYS_PER_WEEK
    }

    /// `(row, column)` of `date` in the day grid, or `None` if the date
    /// belongs to a different month.
    ///
    /// This is the single source of truth for the weekday rotation rule;
    /// the range geometry calculator maps days through it as well.
    pub fn grid_position(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if !self.contains(date) {
            return None;
        }
        let leading = self.days.iter().position(Option::is_some).unwrap_or(0);
        let cell = leading + date.day() as usize - 1;
        Some((cell / DAYS_PER_WEEK, cell % DAYS_PER_WEEK))
    }
}

/// Number of days in the month `first_day` belongs to.
fn last_day_of_month(first_day: NaiveDate) -> u32 {
    first_day
        .with_day(31)
        .map(|_| 31)
        .or_else(|| first_day.with_day(30).map(|_| 30))
        .or_else(|| first_day.with_day(29).map(|_| 29))
        .unwrap_or(28)
}

fn display_names(first_day: NaiveDate, options: &CalendarOptions) -> (String, String) {
    if let Some(names) = &options.month_names {
        let name = names[first_day.month0() as usize].clone();
        let short_name = name.chars().take(3).collect();
        return (name, short_name);
    }

    #[cfg(feature = "locales")]
    {
        (
            first_day
                .format_localized("%B", options.locale)
                .to_string(),
            first_day
                .format_localized("%b", options.locale)
                .to_string(),
        )
    }
    #[cfg(not(feature = "locales"))]
    {
        (
            first_day.format("%B").to_string(),
            first_day.format("%b").to_string(),
        )
    }
}

/// `(year, month)` shifted by `delta` months.
pub(crate) fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 + delta;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

/// Generates the ordered month sequence covering the effective bounds:
/// both explicit month bounds if both are given, else one explicit bound plus
/// a buffer of months in the open direction, else a buffer window around today.
pub(crate) fn generate_months(options: &CalendarOptions, today: NaiveDate) -> Vec<CalendarMonth> {
    let min = options.min_month.or(options.min_date);
    let max = options.max_month.or(options.max_date);

    let (start, end) = match (min, max) {
        (Some(min), Some(max)) => ((min.year(), min.month()), (max.year(), max.month())),
        (Some(min), None) => (
            (min.year(), min.month()),
            add_months(today.year(), today.month(), options.month_buffer.after as i32),
        ),
        (None, Some(max)) => (
            add_months(
                today.year(),
                today.month(),
                -(options.month_buffer.before as i32),
            ),
            (max.year(), max.month()),
        ),
        (None, None) => (
            add_months(
                today.year(),
                today.month(),
                -(options.month_buffer.before as i32),
            ),
            add_months(today.year(), today.month(), options.month_buffer.after as i32),
        ),
    };

    let mut months = Vec::new();
    let (mut year, mut month) = start;
    loop {
        months.push(CalendarMonth::generate(year, month, options));
        if (year, month) == end {
            break;
        }
        (year, month) = add_months(year, month, 1);
    }
    months
}
