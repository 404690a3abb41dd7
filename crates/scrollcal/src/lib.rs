//! scrollcal is a headless engine for infinitely scrollable month calendars:
//! month-grid generation, single/range date selection, disabled-date policy,
//! list virtualization and range-highlight geometry, with no rendering and no
//! UI framework dependency.
//!
//! The entry point is [`Calendar`]: construct one from [`CalendarOptions`],
//! drive it with the action methods (`select_date`, `set_hovered_date`,
//! `scroll_to_month`, ...) and read everything the view layer needs back out
//! of it each frame. All state lives in the engine; all derived data
//! (per-day flags, range segments, rounded outlines) is recomputed from it on
//! demand.
//!
//! ```
//! use chrono::NaiveDate;
//! use scrollcal::{Calendar, CalendarOptions, SelectionMode};
//!
//! let mut calendar = Calendar::new(CalendarOptions {
//!     selection_mode: SelectionMode::Range,
//!     ..Default::default()
//! });
//!
//! calendar.select_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
//! calendar.select_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
//! assert_eq!(calendar.days_in_range(), 5);
//! ```
//!
//! The scrolling side is deliberately inverted from a widget library: the
//! engine never touches a scroll view. Instead [`window::VirtualWindow`]
//! tells the embedder which months to materialize and at what offsets, and
//! the embedder feeds viewport geometry and measured month heights back in.
//!
//! ## Feature flags
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!

#![forbid(unsafe_code)]

pub mod calendar;
pub mod contour;
pub mod geometry;
pub mod month;
pub mod policy;
pub mod selection;
pub mod window;

pub use calendar::{Calendar, CalendarOptions, MonthBuffer};
pub use contour::{ContourPath, CornerFlags, PathCommand};
pub use geometry::{RangeGeometry, RangeSegment};
pub use month::{CalendarDay, CalendarMonth, WeekStart, DAYS_PER_WEEK};
pub use policy::{DisabledDates, DisabledRule};
pub use selection::{DateRange, RangeValue, SelectionMode};
pub use window::{Align, VirtualItem, VirtualWindow, Viewport, Windowing};

/// `vec2`/`pos2`/`Rect` re-export so embedders don't need a separate `emath`
/// dependency for the geometry types.
pub use emath;
