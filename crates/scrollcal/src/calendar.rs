//! The engine facade: configuration, state, actions and derived queries.

use chrono::{NaiveDate, Weekday};
use emath::Vec2;

use crate::contour::{self, ContourPath};
use crate::geometry::{range_segments, RangeGeometry};
use crate::month::{self, CalendarMonth, WeekStart, DAYS_PER_WEEK};
use crate::policy::{DisabledDates, DisabledRule};
use crate::selection::{self, DateRange, RangeValue, SelectionMode};
use crate::window::{Align, UniformWindowing, VirtualWindow};

/// How many months to generate beyond today in each direction when the
/// corresponding bound is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MonthBuffer {
    pub before: u32,
    pub after: u32,
}

impl Default for MonthBuffer {
    fn default() -> Self {
        Self {
            before: 12,
            after: 24,
        }
    }
}

/// Configuration for a [`Calendar`]. Plain data; construct with struct-update
/// syntax over [`Default::default`].
///
/// Swapped `min`/`max` pairs and out-of-order default ranges are not errors:
/// they are normalized on construction with a [`log::warn!`] diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarOptions {
    pub selection_mode: SelectionMode,
    /// Initial value when the engine owns the selection.
    pub default_value: DateRange,
    /// Supplying a value makes the selection caller-owned ("controlled"):
    /// the engine reads this snapshot and returns transition results instead
    /// of applying them. Feed changes back via [`Calendar::set_value`].
    pub value: Option<DateRange>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// Month-granular bounds; take precedence over the date bounds for
    /// deciding which months to generate.
    pub min_month: Option<NaiveDate>,
    pub max_month: Option<NaiveDate>,
    /// Flat disabled-date list (legacy form, still supported).
    pub disabled_dates: Vec<NaiveDate>,
    /// Disabled weekdays (legacy form, still supported).
    pub disabled_weekdays: Vec<Weekday>,
    /// Structured exclusion rules; unioned with the flat lists.
    pub disabled_rules: Vec<DisabledRule>,
    pub week_start: WeekStart,
    /// Weekday header labels in grid order, overriding the built-in names.
    pub day_names: Option<[String; 7]>,
    /// Month display names January..December, overriding the built-in names.
    pub month_names: Option<[String; 12]>,
    pub month_buffer: MonthBuffer,
    /// Estimated month height in pixels, used by the virtualization window
    /// until real measurements arrive.
    pub estimated_month_height: f32,
    /// Extra months materialized on each side of the viewport.
    pub overscan: usize,
    /// Locale used for the built-in day and month names.
    #[cfg(feature = "locales")]
    pub locale: chrono::Locale,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            default_value: DateRange::EMPTY,
            value: None,
            min_date: None,
            max_date: None,
            min_month: None,
            max_month: None,
            disabled_dates: Vec::new(),
            disabled_weekdays: Vec::new(),
            disabled_rules: Vec::new(),
            week_start: WeekStart::default(),
            day_names: None,
            month_names: None,
            month_buffer: MonthBuffer::default(),
            estimated_month_height: 320.0,
            overscan: 3,
            #[cfg(feature = "locales")]
            locale: chrono::Locale::en_US,
        }
    }
}

/// The scrollable calendar engine.
///
/// Owns selection/hover/mode state, the generated month sequence and the
/// virtualization window. All mutation happens synchronously through the
/// action methods; every derived value (day flags, segments, outlines) is
/// recomputed on demand from current state.
///
/// ```
/// use chrono::NaiveDate;
/// use scrollcal::{Calendar, CalendarOptions};
///
/// let mut calendar = Calendar::new(CalendarOptions::default());
/// let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// calendar.select_date(start);
/// calendar.select_date(end);
/// assert_eq!(calendar.days_in_range(), 5);
/// ```
pub struct Calendar {
    options: CalendarOptions,
    policy: DisabledDates,
    months: Vec<CalendarMonth>,
    range: RangeValue,
    hover: Option<NaiveDate>,
    mode: SelectionMode,
    today: NaiveDate,
    current_month_index: usize,
    window: VirtualWindow,
}

impl Calendar {
    /// A calendar centered around the system clock's current date.
    pub fn new(options: CalendarOptions) -> Self {
        Self::with_today(options, chrono::Local::now().date_naive())
    }

    /// A calendar with an explicit "today", for deterministic construction.
    pub fn with_today(mut options: CalendarOptions, today: NaiveDate) -> Self {
        normalize_options(&mut options);

        let range = match options.value {
            Some(value) => RangeValue::External(normalize_range(value)),
            None => RangeValue::Owned(options.default_value),
        };

        let months = month::generate_months(&options, today);
        let policy = policy_from(&options);
        let current_month_index = initial_month_index(&months, range.get().start, today);
        let window = VirtualWindow::new(
            Box::new(UniformWindowing::new(
                months.len(),
                options.estimated_month_height,
                options.overscan,
            )),
            current_month_index,
        );

        Self {
            mode: options.selection_mode,
            options,
            policy,
            months,
            range,
            hover: None,
            today,
            current_month_index,
            window,
        }
    }

    /// Reconfigures the engine: bounds are revalidated and the month sequence
    /// is regenerated wholesale. Selection ownership follows the new options;
    /// the readiness latch is not reset.
    pub fn set_options(&mut self, mut options: CalendarOptions) {
        normalize_options(&mut options);

        self.range = match options.value {
            Some(value) => RangeValue::External(normalize_range(value)),
            None => match self.range {
                RangeValue::Owned(range) => RangeValue::Owned(range),
                RangeValue::External(_) => RangeValue::Owned(options.default_value),
            },
        };
        self.mode = options.selection_mode;
        self.months = month::generate_months(&options, self.today);
        self.policy = policy_from(&options);
        self.current_month_index =
            initial_month_index(&self.months, self.range.get().start, self.today);
        self.window.reset_primitive(
            Box::new(UniformWindowing::new(
                self.months.len(),
                options.estimated_month_height,
                options.overscan,
            )),
            self.current_month_index,
        );
        self.options = options;
    }

    // ------------------------------------------------------------------
    // State

    pub fn options(&self) -> &CalendarOptions {
        &self.options
    }

    /// The current selection, wherever it is owned.
    pub fn selected_range(&self) -> DateRange {
        self.range.get()
    }

    /// Whether the selection is caller-owned.
    pub fn is_controlled(&self) -> bool {
        self.range.is_external()
    }

    pub fn hovered_date(&self) -> Option<NaiveDate> {
        self.hover
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn months(&self) -> &[CalendarMonth] {
        &self.months
    }

    pub fn current_month_index(&self) -> usize {
        self.current_month_index
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Ready to paint: the initial scroll target has been applied and the
    /// settle delay has elapsed. See [`crate::window::VirtualWindow`].
    pub fn is_initialized(&self) -> bool {
        self.window.is_initialized()
    }

    pub fn virtual_window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn virtual_window_mut(&mut self) -> &mut VirtualWindow {
        &mut self.window
    }

    /// Weekday header labels in grid order.
    pub fn weekday_names(&self) -> [String; 7] {
        if let Some(names) = &self.options.day_names {
            return names.clone();
        }
        let mut weekday = self.options.week_start.first_weekday();
        std::array::from_fn(|_| {
            let name = weekday_label(weekday, &self.options);
            weekday = weekday.succ();
            name
        })
    }

    // ------------------------------------------------------------------
    // Actions

    /// Applies a date click.
    ///
    /// Disabled dates are silently ignored (`None`). Otherwise returns the
    /// next committed range; with a caller-owned value this is only a
    /// notification and must be fed back via [`Self::set_value`].
    pub fn select_date(&mut self, date: NaiveDate) -> Option<DateRange> {
        if self.is_date_disabled(Some(date)) {
            return None;
        }
        let next = selection::next_range(self.mode, self.range.get(), date);
        self.range.commit(next);
        Some(next)
    }

    pub fn clear_selection(&mut self) -> DateRange {
        self.range.commit(DateRange::EMPTY);
        self.hover = None;
        DateRange::EMPTY
    }

    /// Sets the hover-preview date. Only affects derived state while a range
    /// is in progress.
    pub fn set_hovered_date(&mut self, date: Option<NaiveDate>) {
        self.hover = date;
    }

    /// Switches the selection mode and unconditionally clears the selection.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> DateRange {
        self.mode = mode;
        self.clear_selection()
    }

    /// Feeds a caller-owned value back into the engine (or overwrites an
    /// engine-owned one). Out-of-order input is normalized with a diagnostic.
    pub fn set_value(&mut self, value: DateRange) {
        self.range.set(normalize_range(value));
    }

    pub fn scroll_to_month(&mut self, index: usize) {
        assert!(
            index < self.months.len(),
            "scroll_to_month: index {index} out of bounds for {} months",
            self.months.len()
        );
        self.current_month_index = index;
        self.window.scroll_to(index, Align::Center);
    }

    pub fn scroll_to_today(&mut self) {
        let index = self
            .months
            .iter()
            .position(|month| month.contains(self.today))
            .unwrap_or(self.current_month_index);
        self.scroll_to_month(index);
    }

    // ------------------------------------------------------------------
    // Derived per-day queries

    pub fn is_date_disabled(&self, date: Option<NaiveDate>) -> bool {
        self.policy.is_disabled(date)
    }

    /// Whether `date` is a committed endpoint of the selection.
    pub fn is_selected(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else { return false };
        let range = self.range.get();
        range.start == Some(date) || range.end == Some(date)
    }

    pub fn is_in_range(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|date| selection::is_in_range(self.mode, self.range.get(), self.hover, date))
    }

    pub fn is_range_start(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|date| {
            selection::is_range_start(self.mode, self.range.get(), self.hover, date)
        })
    }

    pub fn is_range_end(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|date| selection::is_range_end(self.mode, self.range.get(), self.hover, date))
    }

    pub fn is_today(&self, date: Option<NaiveDate>) -> bool {
        date == Some(self.today)
    }

    /// Inclusive day count of the committed range, 0 while incomplete.
    pub fn days_in_range(&self) -> i64 {
        self.range.get().days().unwrap_or(0)
    }

    /// Formats a date with the configured locale.
    #[cfg(feature = "locales")]
    pub fn format_date(&self, date: NaiveDate, fmt: &str) -> String {
        date.format_localized(fmt, self.options.locale).to_string()
    }

    // ------------------------------------------------------------------
    // Geometry

    /// The range the highlight overlay should draw: the committed span, or
    /// the provisional start-to-hover span while one endpoint is pending.
    /// Empty in single mode.
    pub fn effective_range(&self) -> DateRange {
        if self.mode == SelectionMode::Single {
            return DateRange::EMPTY;
        }
        let range = self.range.get();
        if range.is_complete() {
            return range;
        }
        let preview = range.preview(self.hover);
        if preview.is_complete() {
            preview
        } else {
            DateRange::EMPTY
        }
    }

    /// The per-week segments of the effective range across all generated
    /// months. Empty when there is nothing to draw.
    pub fn range_geometry(&self, cell_size: Vec2) -> RangeGeometry {
        RangeGeometry {
            segments: range_segments(&self.months, self.effective_range()),
            cell_size,
        }
    }

    /// The closed rounded outline of the effective range within one month,
    /// in that month's grid space.
    pub fn month_outline(&self, month_index: usize, cell_size: Vec2, radius: f32) -> ContourPath {
        let geometry = self.range_geometry(cell_size);
        let segments: Vec<_> = geometry.for_month(month_index).cloned().collect();
        contour::month_outline(&segments, cell_size, radius)
    }

    /// Grid width in pixels for the given cell size.
    pub fn grid_width(cell_size: Vec2) -> f32 {
        DAYS_PER_WEEK as f32 * cell_size.x
    }
}

fn policy_from(options: &CalendarOptions) -> DisabledDates {
    DisabledDates {
        min: options.min_date,
        max: options.max_date,
        dates: options.disabled_dates.clone(),
        weekdays: options.disabled_weekdays.clone(),
        rules: options.disabled_rules.clone(),
    }
}

fn normalize_options(options: &mut CalendarOptions) {
    (options.min_date, options.max_date) =
        normalize_bounds("min_date", options.min_date, "max_date", options.max_date);
    (options.min_month, options.max_month) =
        normalize_bounds("min_month", options.min_month, "max_month", options.max_month);
    options.default_value = normalize_range(options.default_value);
}

fn normalize_bounds(
    min_name: &str,
    min: Option<NaiveDate>,
    max_name: &str,
    max: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => {
            log::warn!("scrollcal: {min_name} {lo} is after {max_name} {hi}; swapping");
            (Some(hi), Some(lo))
        }
        other => other,
    }
}

fn normalize_range(range: DateRange) -> DateRange {
    let (normalized, swapped) = range.normalized();
    if swapped {
        log::warn!("scrollcal: range start is after its end; swapping");
    }
    normalized
}

/// The month the window should land on first: the month of the range start
/// if any, else today's month, else the first generated month.
fn initial_month_index(
    months: &[CalendarMonth],
    range_start: Option<NaiveDate>,
    today: NaiveDate,
) -> usize {
    let target = range_start.unwrap_or(today);
    months
        .iter()
        .position(|month| month.contains(target))
        .unwrap_or(0)
}

fn weekday_label(weekday: Weekday, options: &CalendarOptions) -> String {
    #[cfg(feature = "locales")]
    {
        // 2024-01-01 was a Monday; offset to a date with the right weekday.
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1)
            .expect("fixed reference date is valid")
            + chrono::Days::new(weekday.num_days_from_monday() as u64);
        reference.format_localized("%a", options.locale).to_string()
    }
    #[cfg(not(feature = "locales"))]
    {
        let _ = options;
        weekday.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar(options: CalendarOptions) -> Calendar {
        Calendar::with_today(options, date(2025, 1, 15))
    }

    #[test]
    fn swapped_bounds_are_normalized_on_construction() {
        let c = calendar(CalendarOptions {
            min_date: Some(date(2025, 12, 31)),
            max_date: Some(date(2024, 9, 1)),
            ..Default::default()
        });
        assert_eq!(c.options().min_date, Some(date(2024, 9, 1)));
        assert_eq!(c.options().max_date, Some(date(2025, 12, 31)));
        assert_eq!(c.months().first().unwrap().first_day, date(2024, 9, 1));
    }

    #[test]
    fn swapped_default_value_is_normalized_on_construction() {
        let c = calendar(CalendarOptions {
            default_value: DateRange::new(date(2025, 1, 20), date(2025, 1, 5)),
            ..Default::default()
        });
        assert_eq!(
            c.selected_range(),
            DateRange::new(date(2025, 1, 5), date(2025, 1, 20))
        );
    }

    #[test]
    fn selecting_a_disabled_date_is_a_silent_noop() {
        let mut c = calendar(CalendarOptions {
            disabled_weekdays: vec![Weekday::Sat, Weekday::Sun],
            ..Default::default()
        });
        // 2025-01-18 is a Saturday.
        assert_eq!(c.select_date(date(2025, 1, 18)), None);
        assert_eq!(c.selected_range(), DateRange::EMPTY);

        // Repeated attempts stay a no-op.
        assert_eq!(c.select_date(date(2025, 1, 18)), None);
        assert_eq!(c.selected_range(), DateRange::EMPTY);
    }

    #[test]
    fn two_clicks_commit_an_ordered_range_either_way() {
        let mut c = calendar(CalendarOptions::default());
        c.select_date(date(2025, 1, 10));
        c.select_date(date(2025, 1, 3));
        assert_eq!(
            c.selected_range(),
            DateRange::new(date(2025, 1, 3), date(2025, 1, 10))
        );
        assert_eq!(c.days_in_range(), 8);
    }

    #[test]
    fn mode_switch_clears_the_selection() {
        let mut c = calendar(CalendarOptions::default());
        c.select_date(date(2025, 1, 3));
        c.select_date(date(2025, 1, 10));
        c.set_hovered_date(Some(date(2025, 1, 12)));

        c.set_selection_mode(SelectionMode::Single);
        assert_eq!(c.selected_range(), DateRange::EMPTY);
        assert_eq!(c.hovered_date(), None);

        c.select_date(date(2025, 1, 4));
        assert_eq!(c.selected_range(), DateRange::single(date(2025, 1, 4)));
        assert!(c.is_selected(Some(date(2025, 1, 4))));
        assert!(!c.is_in_range(Some(date(2025, 1, 4)))); // no range concept in single mode
    }

    #[test]
    fn controlled_values_require_explicit_feedback() {
        let mut c = calendar(CalendarOptions {
            value: Some(DateRange::EMPTY),
            ..Default::default()
        });
        assert!(c.is_controlled());

        let next = c.select_date(date(2025, 1, 3)).unwrap();
        assert_eq!(next, DateRange::single(date(2025, 1, 3)));
        // Not applied yet: the caller owns the value.
        assert_eq!(c.selected_range(), DateRange::EMPTY);

        c.set_value(next);
        assert_eq!(c.selected_range(), DateRange::single(date(2025, 1, 3)));
    }

    #[test]
    fn initial_index_prefers_the_range_start_month() {
        let c = calendar(CalendarOptions {
            default_value: DateRange::new(date(2024, 6, 10), date(2024, 6, 12)),
            ..Default::default()
        });
        let index = c.current_month_index();
        assert!(c.months()[index].contains(date(2024, 6, 1)));

        let c = calendar(CalendarOptions::default());
        let index = c.current_month_index();
        assert!(c.months()[index].contains(date(2025, 1, 15)));
    }

    #[test]
    fn scroll_to_today_targets_todays_month() {
        let mut c = calendar(CalendarOptions {
            default_value: DateRange::new(date(2024, 6, 10), date(2024, 6, 12)),
            ..Default::default()
        });
        c.scroll_to_today();
        let index = c.current_month_index();
        assert!(c.months()[index].contains(date(2025, 1, 15)));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn scroll_to_a_nonexistent_month_fails_loudly() {
        let mut c = calendar(CalendarOptions::default());
        c.scroll_to_month(9999);
    }

    #[test]
    fn hover_previews_the_effective_range() {
        let mut c = calendar(CalendarOptions::default());
        assert!(c.effective_range().is_empty());

        c.select_date(date(2025, 1, 10));
        assert!(c.effective_range().is_empty()); // one endpoint, no hover

        c.set_hovered_date(Some(date(2025, 1, 5)));
        assert_eq!(
            c.effective_range(),
            DateRange::new(date(2025, 1, 5), date(2025, 1, 10))
        );
        assert!(c.is_range_start(Some(date(2025, 1, 5))));
        assert!(c.is_range_end(Some(date(2025, 1, 10))));

        c.select_date(date(2025, 1, 20));
        assert_eq!(
            c.selected_range(),
            DateRange::new(date(2025, 1, 10), date(2025, 1, 20))
        );
    }

    #[test]
    fn geometry_is_empty_without_a_drawable_range() {
        let c = calendar(CalendarOptions::default());
        let geometry = c.range_geometry(emath::vec2(48.0, 48.0));
        assert!(geometry.is_empty());
        assert!(c.month_outline(0, emath::vec2(48.0, 48.0), 12.0).is_empty());
    }

    #[test]
    fn weekday_names_rotate_with_the_week_start() {
        let c = calendar(CalendarOptions::default());
        assert_eq!(c.weekday_names()[0], "Sun");

        let c = calendar(CalendarOptions {
            week_start: WeekStart::Monday,
            ..Default::default()
        });
        let names = c.weekday_names();
        assert_eq!(names[0], "Mon");
        assert_eq!(names[6], "Sun");
    }

    #[test]
    fn day_name_overrides_are_used_verbatim() {
        let names: [String; 7] = std::array::from_fn(|i| format!("D{i}"));
        let c = calendar(CalendarOptions {
            day_names: Some(names.clone()),
            ..Default::default()
        });
        assert_eq!(c.weekday_names(), names);
    }

    #[test]
    fn set_options_regenerates_months_wholesale() {
        let mut c = calendar(CalendarOptions::default());
        let before = c.months().len();

        c.set_options(CalendarOptions {
            min_date: Some(date(2025, 1, 1)),
            max_date: Some(date(2025, 3, 31)),
            ..Default::default()
        });
        assert_eq!(c.months().len(), 3);
        assert_ne!(c.months().len(), before);
        assert!(c.months()[c.current_month_index()].contains(date(2025, 1, 15)));
    }
}
