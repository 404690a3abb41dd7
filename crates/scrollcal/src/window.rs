//! The virtualization window: which months are materialized for the current
//! scroll offset, and where.
//!
//! The actual windowing arithmetic lives behind the [`Windowing`] trait so the
//! engine never depends on a particular scrolling implementation; the bundled
//! [`UniformWindowing`] covers the common case of one estimated month height
//! refined by per-month measurements.

use std::time::{Duration, Instant};

/// The scrollable viewport, in pixels of virtual content space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Viewport {
    /// Scroll offset of the top edge.
    pub offset: f32,
    /// Visible height.
    pub height: f32,
}

/// A materialized month: its index in the generated sequence, its start
/// offset in content space and its (measured or estimated) size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VirtualItem {
    pub index: usize,
    pub offset: f32,
    pub size: f32,
}

/// Where a scrolled-to item should land in the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Scroll the minimal amount that brings the item fully into view.
    #[default]
    Auto,
}

/// The injected windowing capability.
pub trait Windowing {
    /// Total height of all items.
    fn total_size(&self) -> f32;

    /// The items that should be materialized for `viewport`, in index order.
    fn materialize(&self, viewport: Viewport) -> Vec<VirtualItem>;

    /// The scroll offset that places `index` according to `align`.
    fn scroll_offset(&self, index: usize, align: Align, viewport: Viewport) -> f32;

    /// Feed back a measured item size, refining future layouts.
    fn measure(&mut self, index: usize, size: f32);
}

/// Windowing over a fixed item count with one estimated size, refined by
/// per-item measurements. Offsets are prefix sums over the current sizes.
#[derive(Clone, Debug)]
pub struct UniformWindowing {
    sizes: Vec<f32>,
    overscan: usize,
}

impl UniformWindowing {
    pub fn new(count: usize, estimated_size: f32, overscan: usize) -> Self {
        Self {
            sizes: vec![estimated_size; count],
            overscan,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn offset_of(&self, index: usize) -> f32 {
        self.sizes[..index].iter().sum()
    }

    /// Indices of the items intersecting the viewport, before overscan.
    fn visible_range(&self, viewport: Viewport) -> std::ops::Range<usize> {
        let mut first = None;
        let mut offset = 0.0;
        let mut end = self.sizes.len();
        for (i, size) in self.sizes.iter().enumerate() {
            if offset + size > viewport.offset && first.is_none() {
                first = Some(i);
            }
            if offset >= viewport.offset + viewport.height {
                end = i;
                break;
            }
            offset += size;
        }
        first.unwrap_or(end)..end
    }
}

impl Windowing for UniformWindowing {
    fn total_size(&self) -> f32 {
        self.sizes.iter().sum()
    }

    fn materialize(&self, viewport: Viewport) -> Vec<VirtualItem> {
        let visible = self.visible_range(viewport);
        let start = visible.start.saturating_sub(self.overscan);
        let end = (visible.end + self.overscan).min(self.sizes.len());

        let mut offset = self.offset_of(start);
        (start..end)
            .map(|index| {
                let size = self.sizes[index];
                let item = VirtualItem {
                    index,
                    offset,
                    size,
                };
                offset += size;
                item
            })
            .collect()
    }

    fn scroll_offset(&self, index: usize, align: Align, viewport: Viewport) -> f32 {
        let start = self.offset_of(index);
        let size = self.sizes[index];
        let raw = match align {
            Align::Start => start,
            Align::Center => start - (viewport.height - size) / 2.0,
            Align::End => start + size - viewport.height,
            Align::Auto => {
                if start < viewport.offset {
                    start
                } else if start + size > viewport.offset + viewport.height {
                    start + size - viewport.height
                } else {
                    viewport.offset
                }
            }
        };
        raw.clamp(0.0, (self.total_size() - viewport.height).max(0.0))
    }

    fn measure(&mut self, index: usize, size: f32) {
        self.sizes[index] = size;
    }
}

/// How long after the initial positioning the window keeps reporting
/// "not ready", masking first-layout measurement jitter.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Wraps a [`Windowing`] primitive with viewport state, pending scroll
/// requests and the one-shot readiness latch.
///
/// The embedding view layer drives it: supply the viewport via
/// [`Self::set_viewport`], honor offsets returned by
/// [`Self::take_scroll_request`], feed back sizes via [`Self::measure`], and
/// poll [`Self::poll_ready`] before first paint.
pub struct VirtualWindow {
    primitive: Box<dyn Windowing>,
    viewport: Option<Viewport>,
    pending_scroll: Option<(usize, Align)>,
    positioned: bool,
    measured: bool,
    ready_at: Option<Instant>,
    initialized: bool,
}

impl VirtualWindow {
    /// A new window with a pending scroll to `initial_index`, so the first
    /// materialization already covers the initial month.
    pub fn new(primitive: Box<dyn Windowing>, initial_index: usize) -> Self {
        Self {
            primitive,
            viewport: None,
            pending_scroll: Some((initial_index, Align::Start)),
            positioned: false,
            measured: false,
            ready_at: None,
            initialized: false,
        }
    }

    /// Swaps in a new primitive (after the month sequence was regenerated) and
    /// queues a scroll to `index`. Viewport and readiness state are kept; the
    /// latch fires once per mount, not per reconfiguration.
    pub fn reset_primitive(&mut self, primitive: Box<dyn Windowing>, index: usize) {
        self.primitive = primitive;
        self.measured = false;
        self.scroll_to(index, Align::Start);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn viewport_or_panic(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| {
            panic!("VirtualWindow used before set_viewport; the view layer must supply a viewport first")
        })
    }

    pub fn total_size(&self) -> f32 {
        self.primitive.total_size()
    }

    /// The materialized months for the current viewport.
    ///
    /// Panics if no viewport was ever supplied; that is a composition error,
    /// not bad input data.
    pub fn items(&self) -> Vec<VirtualItem> {
        self.primitive.materialize(self.viewport_or_panic())
    }

    /// Request a scroll; the target offset is handed out once through
    /// [`Self::take_scroll_request`].
    pub fn scroll_to(&mut self, index: usize, align: Align) {
        self.pending_scroll = Some((index, align));
    }

    /// The offset the embedder should scroll to, if a request is pending.
    /// The window assumes the offset is honored and updates its own viewport
    /// to match.
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        let (index, align) = self.pending_scroll.take()?;
        let mut viewport = self.viewport_or_panic();
        let offset = self.primitive.scroll_offset(index, align, viewport);
        viewport.offset = offset;
        self.viewport = Some(viewport);
        self.positioned = true;
        self.maybe_arm(Instant::now());
        Some(offset)
    }

    /// Feed back a measured month height.
    pub fn measure(&mut self, index: usize, size: f32) {
        self.primitive.measure(index, size);
        self.measured = true;
        self.maybe_arm(Instant::now());
    }

    // Arms the settle timer once the initial position is applied and at
    // least one measurement pass has happened. One-shot per mount.
    fn maybe_arm(&mut self, now: Instant) {
        if self.positioned && self.measured && self.ready_at.is_none() {
            self.ready_at = Some(now + SETTLE_DELAY);
        }
    }

    /// Whether the window is ready to paint, latching once the settle delay
    /// after initial positioning has passed.
    pub fn poll_ready(&mut self) -> bool {
        self.poll_ready_at(Instant::now())
    }

    pub fn poll_ready_at(&mut self, now: Instant) -> bool {
        if !self.initialized {
            if let Some(ready_at) = self.ready_at {
                if now >= ready_at {
                    self.initialized = true;
                }
            }
        }
        self.initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl std::fmt::Debug for VirtualWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualWindow")
            .field("viewport", &self.viewport)
            .field("pending_scroll", &self.pending_scroll)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
