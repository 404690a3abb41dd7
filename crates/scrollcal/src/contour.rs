//! The contour path synthesizer: turns one month's range segments into a
//! single closed outline with selectively rounded corners, so the view layer
//! can paint one continuous highlight instead of one per day cell.

use emath::{pos2, Pos2, Rect, Vec2};

use crate::geometry::RangeSegment;

/// Which corners of a segment's rectangle are boundary corners of the merged
/// shape and therefore round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CornerFlags {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

impl CornerFlags {
    pub const NONE: Self = Self {
        top_left: false,
        top_right: false,
        bottom_left: false,
        bottom_right: false,
    };

    pub const ALL: Self = Self {
        top_left: true,
        top_right: true,
        bottom_left: true,
        bottom_right: true,
    };

    pub fn any(&self) -> bool {
        self.top_left || self.top_right || self.bottom_left || self.bottom_right
    }
}

/// Corner classification for one month's ordered segments.
///
/// Only the true ends of the range round: the first segment's top corners
/// when it carries the global range start, and the last segment's bottom
/// corners when it carries the global range end. Continuations clipped at a
/// month boundary and interior row transitions stay square, for any number
/// of rows.
pub fn corner_flags(segments: &[RangeSegment]) -> Vec<CornerFlags> {
    let last = segments.len().saturating_sub(1);
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let top = i == 0 && segment.is_first_segment;
            let bottom = i == last && segment.is_last_segment;
            CornerFlags {
                top_left: top,
                top_right: top,
                bottom_left: bottom,
                bottom_right: bottom,
            }
        })
        .collect()
}

/// A segment's pixel rectangle in its month's grid space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRect {
    pub rect: Rect,
    pub row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

/// One rectangle per segment, from `row * cell_height` and
/// `start_col * cell_width .. (end_col + 1) * cell_width`.
pub fn segment_rects(segments: &[RangeSegment], cell_size: Vec2) -> Vec<SegmentRect> {
    segments
        .iter()
        .map(|segment| {
            let min = pos2(
                segment.start_col as f32 * cell_size.x,
                segment.start_row as f32 * cell_size.y,
            );
            let max = pos2(
                (segment.end_col + 1) as f32 * cell_size.x,
                (segment.end_row + 1) as f32 * cell_size.y,
            );
            SegmentRect {
                rect: Rect::from_min_max(min, max),
                row: segment.start_row,
                start_col: segment.start_col,
                end_col: segment.end_col,
            }
        })
        .collect()
}

/// A polygon vertex, marked when it is a corner to round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourPoint {
    pub pos: Pos2,
    pub rounded: bool,
}

impl ContourPoint {
    fn sharp(pos: Pos2) -> Self {
        Self {
            pos,
            rounded: false,
        }
    }
}

/// Walks the union of the stacked rectangles into one ordered closed polygon:
/// top edge left-to-right, right edge downward (with jog points where
/// consecutive right edges differ), bottom edge right-to-left, then the left
/// edge upward symmetrically.
pub fn contour_points(rects: &[SegmentRect], corners: &[CornerFlags]) -> Vec<ContourPoint> {
    let (Some(first), Some(last)) = (rects.first(), rects.last()) else {
        return Vec::new();
    };
    debug_assert_eq!(rects.len(), corners.len());
    let top = corners.first().copied().unwrap_or(CornerFlags::NONE);
    let bottom = corners.last().copied().unwrap_or(CornerFlags::NONE);

    let mut points = Vec::new();

    points.push(ContourPoint {
        pos: first.rect.left_top(),
        rounded: top.top_left,
    });
    points.push(ContourPoint {
        pos: first.rect.right_top(),
        rounded: top.top_right,
    });

    // Right edge.
    for pair in rects.windows(2) {
        let (rect, next) = (pair[0].rect, pair[1].rect);
        if next.right() != rect.right() {
            points.push(ContourPoint::sharp(rect.right_bottom()));
            points.push(ContourPoint::sharp(pos2(next.right(), rect.bottom())));
            if next.top() != rect.bottom() {
                points.push(ContourPoint::sharp(next.right_top()));
            }
        }
    }

    points.push(ContourPoint {
        pos: last.rect.right_bottom(),
        rounded: bottom.bottom_right,
    });
    points.push(ContourPoint {
        pos: last.rect.left_bottom(),
        rounded: bottom.bottom_left,
    });

    // Left edge, bottom to top.
    for pair in rects.windows(2).rev() {
        let (rect, below) = (pair[0].rect, pair[1].rect);
        if rect.left() != below.left() {
            points.push(ContourPoint::sharp(pos2(below.left(), below.top())));
            points.push(ContourPoint::sharp(pos2(rect.left(), below.top())));
            if rect.bottom() != below.top() {
                points.push(ContourPoint::sharp(rect.left_bottom()));
            }
        }
    }

    points
}

/// A renderable outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Pos2),
    LineTo(Pos2),
    /// A quadratic curve; the control point is the original sharp vertex.
    QuadTo { control: Pos2, end: Pos2 },
    Close,
}

/// One closed rounded-rectilinear outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourPath {
    pub commands: Vec<PathCommand>,
}

impl ContourPath {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Flattens the path into a closed polyline. Quadratic curves are
    /// subdivided until the control point deviates from the chord by at most
    /// `tolerance`.
    pub fn flatten(&self, tolerance: f32) -> Vec<Pos2> {
        let mut out = Vec::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => out.push(p),
                PathCommand::QuadTo { control, end } => {
                    let from = *out.last().expect("QuadTo requires a current point");
                    flatten_quad(from, control, end, tolerance, &mut out);
                }
                PathCommand::Close => {}
            }
        }
        out
    }

    /// SVG path data (`M`/`L`/`Q`/`Z`), the overlay format the original
    /// renderer consumed.
    pub fn to_svg(&self) -> String {
        use std::fmt::Write as _;

        let mut svg = String::new();
        for command in &self.commands {
            if !svg.is_empty() {
                svg.push(' ');
            }
            match *command {
                PathCommand::MoveTo(p) => write!(svg, "M {} {}", p.x, p.y),
                PathCommand::LineTo(p) => write!(svg, "L {} {}", p.x, p.y),
                PathCommand::QuadTo { control, end } => {
                    write!(svg, "Q {} {} {} {}", control.x, control.y, end.x, end.y)
                }
                PathCommand::Close => write!(svg, "Z"),
            }
            .expect("writing to a String never fails");
        }
        svg
    }
}

// Recursive midpoint subdivision; plenty for quarter-turn corner arcs.
fn flatten_quad(from: Pos2, control: Pos2, to: Pos2, tolerance: f32, out: &mut Vec<Pos2>) {
    let chord_mid = from + (to - from) / 2.0;
    if (control - chord_mid).length() <= tolerance.max(f32::EPSILON) {
        out.push(to);
        return;
    }
    // De Casteljau split at t = 0.5.
    let a = from + (control - from) / 2.0;
    let b = control + (to - control) / 2.0;
    let mid = a + (b - a) / 2.0;
    flatten_quad(from, a, mid, tolerance, out);
    flatten_quad(mid, b, to, tolerance, out);
}

/// Replaces every vertex flagged for rounding with a quadratic corner whose
/// control point is the original vertex, clamped so the radius never exceeds
/// half of either adjacent edge.
pub fn rounded_contour(points: &[ContourPoint], radius: f32) -> ContourPath {
    if points.len() < 3 {
        return ContourPath::default();
    }

    let n = points.len();
    let mut commands = Vec::with_capacity(n + 4);

    for i in 0..n {
        let point = points[i];
        let prev = points[(i + n - 1) % n].pos;
        let next = points[(i + 1) % n].pos;
        match corner_arc(point, prev, next, radius) {
            Some((entry, exit)) => {
                if i == 0 {
                    commands.push(PathCommand::MoveTo(exit));
                } else {
                    commands.push(PathCommand::LineTo(entry));
                    commands.push(PathCommand::QuadTo {
                        control: point.pos,
                        end: exit,
                    });
                }
            }
            None => {
                if i == 0 {
                    commands.push(PathCommand::MoveTo(point.pos));
                } else {
                    commands.push(PathCommand::LineTo(point.pos));
                }
            }
        }
    }

    // The seam: reapply the rounding of the starting vertex before closing.
    let first = points[0];
    if let Some((entry, exit)) = corner_arc(first, points[n - 1].pos, points[1].pos, radius) {
        commands.push(PathCommand::LineTo(entry));
        commands.push(PathCommand::QuadTo {
            control: first.pos,
            end: exit,
        });
    }
    commands.push(PathCommand::Close);

    ContourPath { commands }
}

/// Entry and exit points of the rounded corner at `point`, or `None` when the
/// vertex stays sharp or an adjacent edge degenerates.
fn corner_arc(point: ContourPoint, prev: Pos2, next: Pos2, radius: f32) -> Option<(Pos2, Pos2)> {
    if !point.rounded || radius <= 0.0 {
        return None;
    }
    let incoming = point.pos - prev;
    let outgoing = next - point.pos;
    let (len_in, len_out) = (incoming.length(), outgoing.length());
    if len_in == 0.0 || len_out == 0.0 {
        return None;
    }
    let r = radius.min(len_in / 2.0).min(len_out / 2.0);
    Some((
        point.pos - incoming * (r / len_in),
        point.pos + outgoing * (r / len_out),
    ))
}

/// Synthesizes the final outline for one month's segments.
pub fn month_outline(segments: &[RangeSegment], cell_size: Vec2, radius: f32) -> ContourPath {
    let rects = segment_rects(segments, cell_size);
    let corners = corner_flags(segments);
    let points = contour_points(&rects, &corners);
    rounded_contour(&points, radius)
}
