//! Range geometry: the per-week rectangular segments a selected span covers
//! within each generated month.

use chrono::NaiveDate;
use emath::Vec2;

use crate::month::CalendarMonth;
use crate::selection::DateRange;

/// The portion of the selected range confined to one week row of one month.
///
/// Multiple segments compose the full range across rows and months. Derived
/// on demand from current state; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RangeSegment {
    /// Index into the generated month sequence.
    pub month_index: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
    /// Whether this segment contains the global range start (as opposed to a
    /// continuation clipped at a month boundary).
    pub is_first_segment: bool,
    /// Whether this segment contains the global range end.
    pub is_last_segment: bool,
    /// The days covered, in order.
    pub dates: Vec<NaiveDate>,
}

impl RangeSegment {
    pub fn num_days(&self) -> usize {
        self.dates.len()
    }
}

/// Everything the overlay renderer needs: the ordered segments plus the cell
/// size they were computed against.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeGeometry {
    pub segments: Vec<RangeSegment>,
    pub cell_size: Vec2,
}

impl RangeGeometry {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments falling inside one month, in row order.
    pub fn for_month(&self, month_index: usize) -> impl Iterator<Item = &RangeSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.month_index == month_index)
    }
}

/// Computes the ordered segment sequence for `range` across `months`.
///
/// Each intersecting month is clipped to its own days, then walked
/// day-by-day; a segment closes whenever the grid row changes. An incomplete
/// or non-intersecting range yields no segments, not an error.
pub fn range_segments(months: &[CalendarMonth], range: DateRange) -> Vec<RangeSegment> {
    let (range, _) = range.normalized();
    let (Some(start), Some(end)) = (range.start, range.end) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    for (month_index, month) in months.iter().enumerate() {
        let month_start = month.first_day;
        let month_end = month.last_day();
        if end < month_start || start > month_end {
            continue;
        }
        let clip_start = start.max(month_start);
        let clip_end = end.min(month_end);

        let mut row_start = clip_start;
        let mut day = clip_start;
        loop {
            let next = day.succ_opt().expect("date range within chrono bounds");
            let row_changed = next > clip_end
                || month.grid_position(next).map(|(row, _)| row)
                    != month.grid_position(day).map(|(row, _)| row);
            if row_changed {
                let (start_row, start_col) = month
                    .grid_position(row_start)
                    .expect("clipped day lies inside its month");
                let (end_row, end_col) = month
                    .grid_position(day)
                    .expect("clipped day lies inside its month");
                let dates: Vec<NaiveDate> = row_start.iter_days().take_while(|d| *d <= day).collect();
                segments.push(RangeSegment {
                    month_index,
                    start_row,
                    end_row,
                    start_col,
                    end_col,
                    is_first_segment: row_start == start,
                    is_last_segment: day == end,
                    dates,
                });
                row_start = next;
            }
            if next > clip_end {
                break;
            }
            day = next;
        }
    }
    segments
}
