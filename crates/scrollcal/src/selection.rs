//! Range/selection state: the [`DateRange`] value type, the ownership variant
//! for controlled vs. uncontrolled use, and the pure selection transitions.

use chrono::NaiveDate;

/// How clicks commit to the selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SelectionMode {
    /// One date; every click replaces it.
    Single,
    /// Two clicks commit an inclusive span.
    #[default]
    Range,
}

/// An inclusive selection span. `end` stays `None` while a range is
/// in progress (and always, in single mode).
///
/// When both endpoints are set, `start <= end` holds; out-of-order input is
/// normalized (swapped) on assignment by the [`crate::Calendar`], which emits
/// a diagnostic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const EMPTY: Self = Self {
        start: None,
        end: None,
    };

    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn single(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Both endpoints committed.
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Returns the range with `start <= end`, and whether a swap was needed.
    pub fn normalized(self) -> (Self, bool) {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => (Self::new(end, start), true),
            _ => (self, false),
        }
    }

    /// Whether `date` lies within the committed span. `false` while incomplete.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }

    /// Inclusive day count of the committed span, `None` while incomplete.
    pub fn days(&self) -> Option<i64> {
        let (start, end) = (self.start?, self.end?);
        Some((end - start).num_days() + 1)
    }

    /// The provisional span while exactly one endpoint is committed: the
    /// committed start paired with `hover`, with the roles inverted when the
    /// hovered date precedes the start. Otherwise returns `self` unchanged.
    pub fn preview(self, hover: Option<NaiveDate>) -> Self {
        match (self.start, self.end, hover) {
            (Some(start), None, Some(hover)) => {
                Self::new(start.min(hover), start.max(hover))
            }
            _ => self,
        }
    }
}

/// Who owns the range value; the explicit form of the controlled/uncontrolled
/// contract. Exactly one owner exists at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeValue {
    /// The engine owns the value and applies transitions to it.
    Owned(DateRange),
    /// The caller owns the value: the engine only reads this snapshot, and
    /// transition results must be fed back via [`crate::Calendar::set_value`].
    External(DateRange),
}

impl RangeValue {
    pub fn get(&self) -> DateRange {
        match self {
            Self::Owned(range) | Self::External(range) => *range,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Applies a transition result. A no-op for [`Self::External`]: the
    /// snapshot only changes when the caller feeds the value back.
    pub(crate) fn commit(&mut self, next: DateRange) {
        if let Self::Owned(range) = self {
            *range = next;
        }
    }

    pub(crate) fn set(&mut self, value: DateRange) {
        match self {
            Self::Owned(range) | Self::External(range) => *range = value,
        }
    }
}

/// The `select_date` transition, assuming `picked` already passed the
/// disabled-date policy.
pub(crate) fn next_range(mode: SelectionMode, current: DateRange, picked: NaiveDate) -> DateRange {
    match mode {
        SelectionMode::Single => DateRange::single(picked),
        SelectionMode::Range => match (current.start, current.end) {
            // Complete an in-progress range, inverting roles if needed.
            (Some(start), None) => {
                if picked < start {
                    DateRange::new(picked, start)
                } else {
                    DateRange::new(start, picked)
                }
            }
            // No range yet, or the previous one was complete: start fresh.
            _ => DateRange::single(picked),
        },
    }
}

/// Whether `date` renders as the start of the (possibly previewed) range.
///
/// While one endpoint is pending and the hovered date precedes it, the
/// committed start takes the *end* role and the hovered date becomes the
/// provisional start.
pub(crate) fn is_range_start(
    mode: SelectionMode,
    range: DateRange,
    hover: Option<NaiveDate>,
    date: NaiveDate,
) -> bool {
    if mode == SelectionMode::Single {
        return false;
    }
    match (range.start, range.end, hover) {
        (Some(start), None, Some(hover)) => date == start.min(hover),
        (Some(start), _, _) => date == start,
        _ => false,
    }
}

/// Whether `date` renders as the end of the (possibly previewed) range.
pub(crate) fn is_range_end(
    mode: SelectionMode,
    range: DateRange,
    hover: Option<NaiveDate>,
    date: NaiveDate,
) -> bool {
    if mode == SelectionMode::Single {
        return false;
    }
    match (range.start, range.end, hover) {
        (Some(_), Some(end), _) => date == end,
        (Some(start), None, Some(hover)) => date == start.max(hover),
        _ => false,
    }
}

/// Whether `date` lies within the committed range, or within the provisional
/// start-to-hover span while one endpoint is pending.
pub(crate) fn is_in_range(
    mode: SelectionMode,
    range: DateRange,
    hover: Option<NaiveDate>,
    date: NaiveDate,
) -> bool {
    if mode == SelectionMode::Single {
        return false;
    }
    match (range.start, range.end) {
        (Some(_), Some(_)) => range.contains(date),
        (Some(start), None) => match hover {
            Some(_) => range.preview(hover).contains(date),
            None => date == start,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_completion_is_commutative_under_reversal() {
        let a = date(2025, 1, 3);
        let b = date(2025, 1, 10);

        let forward = next_range(SelectionMode::Range, DateRange::single(a), b);
        let reverse = next_range(SelectionMode::Range, DateRange::single(b), a);
        assert_eq!(forward, DateRange::new(a, b));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn complete_range_starts_fresh_on_next_pick() {
        let complete = DateRange::new(date(2025, 1, 3), date(2025, 1, 10));
        let next = next_range(SelectionMode::Range, complete, date(2025, 2, 1));
        assert_eq!(next, DateRange::single(date(2025, 2, 1)));
    }

    #[test]
    fn single_mode_always_replaces() {
        let current = DateRange::single(date(2025, 1, 3));
        let next = next_range(SelectionMode::Single, current, date(2025, 1, 10));
        assert_eq!(next, DateRange::single(date(2025, 1, 10)));
        assert!(next.end.is_none());
    }

    #[test]
    fn days_is_the_inclusive_count() {
        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 5));
        assert_eq!(range.days(), Some(5));
        assert_eq!(DateRange::single(date(2025, 1, 1)).days(), None);
        assert_eq!(
            DateRange::new(date(2025, 1, 1), date(2025, 1, 1)).days(),
            Some(1)
        );
    }

    #[test]
    fn normalized_swaps_out_of_order_input() {
        let (range, swapped) = DateRange::new(date(2025, 1, 10), date(2025, 1, 3)).normalized();
        assert!(swapped);
        assert_eq!(range, DateRange::new(date(2025, 1, 3), date(2025, 1, 10)));

        let (range, swapped) = DateRange::new(date(2025, 1, 3), date(2025, 1, 10)).normalized();
        assert!(!swapped);
        assert_eq!(range.start, Some(date(2025, 1, 3)));
    }

    #[test]
    fn hover_preview_inverts_roles_live() {
        let start = date(2025, 1, 10);
        let range = DateRange::single(start);
        let before = date(2025, 1, 5);

        // Hovering before the committed start: the hover becomes the start
        // label and the committed start becomes the end label.
        assert!(is_range_start(
            SelectionMode::Range,
            range,
            Some(before),
            before
        ));
        assert!(!is_range_start(
            SelectionMode::Range,
            range,
            Some(before),
            start
        ));
        assert!(is_range_end(
            SelectionMode::Range,
            range,
            Some(before),
            start
        ));

        // Hovering after: roles stay as committed.
        let after = date(2025, 1, 20);
        assert!(is_range_start(
            SelectionMode::Range,
            range,
            Some(after),
            start
        ));
        assert!(is_range_end(SelectionMode::Range, range, Some(after), after));
    }

    #[test]
    fn in_range_uses_committed_or_previewed_span() {
        let committed = DateRange::new(date(2025, 1, 3), date(2025, 1, 10));
        assert!(is_in_range(
            SelectionMode::Range,
            committed,
            None,
            date(2025, 1, 7)
        ));
        assert!(!is_in_range(
            SelectionMode::Range,
            committed,
            None,
            date(2025, 1, 11)
        ));

        let pending = DateRange::single(date(2025, 1, 10));
        let hover = Some(date(2025, 1, 5));
        assert!(is_in_range(
            SelectionMode::Range,
            pending,
            hover,
            date(2025, 1, 7)
        ));
        // Without hover, only the committed start itself counts.
        assert!(is_in_range(
            SelectionMode::Range,
            pending,
            None,
            date(2025, 1, 10)
        ));
        assert!(!is_in_range(
            SelectionMode::Range,
            pending,
            None,
            date(2025, 1, 9)
        ));
    }

    #[test]
    fn single_mode_has_no_range_concept() {
        let range = DateRange::new(date(2025, 1, 3), date(2025, 1, 10));
        assert!(!is_in_range(
            SelectionMode::Single,
            range,
            None,
            date(2025, 1, 5)
        ));
        assert!(!is_range_start(
            SelectionMode::Single,
            range,
            None,
            date(2025, 1, 3)
        ));
    }

    #[test]
    fn external_values_do_not_move_on_commit() {
        let mut value = RangeValue::External(DateRange::EMPTY);
        value.commit(DateRange::single(date(2025, 1, 1)));
        assert_eq!(value.get(), DateRange::EMPTY);

        let mut value = RangeValue::Owned(DateRange::EMPTY);
        value.commit(DateRange::single(date(2025, 1, 1)));
        assert_eq!(value.get(), DateRange::single(date(2025, 1, 1)));
    }
}
