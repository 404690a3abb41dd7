//! The disabled-date policy: a pure predicate over calendar days.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::month::CalendarDay;

/// One structured exclusion rule. Rules are additive: a date is disabled if
/// any rule matches it.
///
/// The flat `disabled_dates`/`disabled_weekdays` lists on
/// [`crate::CalendarOptions`] remain supported alongside these; both forms are
/// evaluated as one union.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DisabledRule {
    /// Explicit list of disabled days, compared by calendar day.
    Dates(Vec<NaiveDate>),
    /// Every occurrence of these weekdays.
    Weekdays(Vec<Weekday>),
    /// Everything strictly before this day.
    Before(NaiveDate),
    /// Everything strictly after this day.
    After(NaiveDate),
    /// Everything within this inclusive span.
    Between { start: NaiveDate, end: NaiveDate },
}

impl DisabledRule {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Dates(dates) => dates.contains(&date),
            Self::Weekdays(weekdays) => weekdays.contains(&date.weekday()),
            Self::Before(bound) => date < *bound,
            Self::After(bound) => date > *bound,
            Self::Between { start, end } => *start <= date && date <= *end,
        }
    }
}

/// The combined disabled-date policy: min/max bounds, the legacy flat lists,
/// and the structured rule set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisabledDates {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    pub dates: Vec<NaiveDate>,
    pub weekdays: Vec<Weekday>,
    pub rules: Vec<DisabledRule>,
}

impl DisabledDates {
    /// Whether `day` may not be selected. Padding cells are always disabled.
    pub fn is_disabled(&self, day: CalendarDay) -> bool {
        let Some(date) = day else {
            return true;
        };
        if self.min.is_some_and(|min| date < min) {
            return true;
        }
        if self.max.is_some_and(|max| date > max) {
            return true;
        }
        if self.weekdays.contains(&date.weekday()) {
            return true;
        }
        if self.dates.contains(&date) {
            return true;
        }
        self.rules.iter().any(|rule| rule.matches(date))
    }
}
