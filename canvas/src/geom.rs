//! Geometry: points, sizes, rectangles, and print-area resolution.
//!
//! Unless a function says otherwise, every coordinate here is in the canvas
//! container's own pixel space (origin at the container's top-left corner),
//! not the viewport. [`Container`] converts viewport ("client") coordinates
//! into that space.
//!
//! Element transforms render as `scale(s) rotate(a)` about the center of the
//! element's layout frame; [`rotated_bounds`], [`project`] and [`unproject`]
//! implement that mapping.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_INITIAL_HEIGHT_PX, MAX_INITIAL_WIDTH_PX};

/// A point in either client or container space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative, or not a finite number.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle stored as origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from its four edges.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { x: left, y: top, width: right - left, height: bottom - top }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `inner` lies fully inside `self`. Edges are inclusive: a
    /// rectangle touching the boundary exactly counts as inside.
    #[must_use]
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        inner.left() >= self.left()
            && inner.top() >= self.top()
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }

    /// Whether `pt` lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, pt: Point) -> bool {
        pt.x >= self.left() && pt.x <= self.right() && pt.y >= self.top() && pt.y <= self.bottom()
    }
}

/// The canvas container: its viewport offset and current pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Container {
    /// Top-left corner of the container in client (viewport) coordinates.
    pub origin: Point,
    /// Current pixel dimensions.
    pub size: Size,
}

impl Container {
    #[must_use]
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Convert a client-space point into container space.
    #[must_use]
    pub fn client_to_local(&self, client: Point) -> Point {
        Point::new(client.x - self.origin.x, client.y - self.origin.y)
    }
}

/// Percentage-based print area declared by a product surface.
///
/// Each field is a percentage (0–100) of the frame the area is resolved
/// against. A field that is absent or not a finite number disables the
/// constraint as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintAreaSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_h: Option<f64>,
}

impl PrintAreaSpec {
    /// A fully specified print area.
    #[must_use]
    pub fn new(print_x: f64, print_y: f64, print_w: f64, print_h: f64) -> Self {
        Self { print_x: Some(print_x), print_y: Some(print_y), print_w: Some(print_w), print_h: Some(print_h) }
    }

    /// All four percentages, or `None` if any is missing or non-finite.
    #[must_use]
    pub fn percentages(&self) -> Option<[f64; 4]> {
        let values = [self.print_x?, self.print_y?, self.print_w?, self.print_h?];
        values.iter().all(|v| v.is_finite()).then_some(values)
    }

    /// Resolve against a container of the given size.
    ///
    /// Returns `None` when the spec is incomplete or the container is degenerate.
    #[must_use]
    pub fn resolve(&self, container: Size) -> Option<Rect> {
        if container.is_degenerate() {
            return None;
        }
        self.resolve_in(Rect::new(0.0, 0.0, container.width, container.height))
    }

    /// Resolve against an arbitrary frame, such as the fitted product image
    /// returned by [`contain_rect`].
    #[must_use]
    pub fn resolve_in(&self, frame: Rect) -> Option<Rect> {
        let [px, py, pw, ph] = self.percentages()?;
        Some(Rect::new(
            frame.x + px / 100.0 * frame.width,
            frame.y + py / 100.0 * frame.height,
            pw / 100.0 * frame.width,
            ph / 100.0 * frame.height,
        ))
    }

    /// Re-derive percentages from a pixel rectangle and the container it was
    /// resolved against.
    #[must_use]
    pub fn from_rect(rect: Rect, container: Size) -> Option<Self> {
        if container.is_degenerate() {
            return None;
        }
        Some(Self::new(
            rect.x / container.width * 100.0,
            rect.y / container.height * 100.0,
            rect.width / container.width * 100.0,
            rect.height / container.height * 100.0,
        ))
    }
}

/// Displayed rectangle of an image drawn with `object-fit: contain` inside a
/// container, centered on the axis with slack.
#[must_use]
pub fn contain_rect(container: Size, natural: Size) -> Option<Rect> {
    if container.is_degenerate() || natural.is_degenerate() {
        return None;
    }
    let container_ratio = container.width / container.height;
    let image_ratio = natural.width / natural.height;
    if image_ratio > container_ratio {
        let height = container.width / image_ratio;
        Some(Rect::new(0.0, (container.height - height) / 2.0, container.width, height))
    } else {
        let width = container.height * image_ratio;
        Some(Rect::new((container.width - width) / 2.0, 0.0, width, container.height))
    }
}

/// Initial layout size of an image element: the natural size, capped to
/// `min(container, 200×300)` with the aspect ratio preserved. Width is
/// checked first.
#[must_use]
pub fn initial_display_size(natural: Size, container: Size) -> Size {
    if natural.is_degenerate() {
        return natural;
    }
    let max_width = container.width.min(MAX_INITIAL_WIDTH_PX);
    let max_height = container.height.min(MAX_INITIAL_HEIGHT_PX);
    if natural.width > max_width {
        Size::new(max_width, max_width * natural.height / natural.width)
    } else if natural.height > max_height {
        Size::new(max_height * natural.width / natural.height, max_height)
    } else {
        natural
    }
}

/// Axis-aligned bounding box of `frame` after scaling by `scale` and rotating
/// by `angle_deg` about its center.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn rotated_bounds(frame: Rect, angle_deg: f64, scale: f64) -> Rect {
    if scale == 1.0 && angle_deg.rem_euclid(360.0) == 0.0 {
        return frame;
    }
    let center = frame.center();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let half_w = frame.width / 2.0;
    let half_h = frame.height / 2.0;
    let extent_x = scale.abs() * (half_w * cos.abs() + half_h * sin.abs());
    let extent_y = scale.abs() * (half_w * sin.abs() + half_h * cos.abs());
    Rect::from_edges(center.x - extent_x, center.y - extent_y, center.x + extent_x, center.y + extent_y)
}

/// Map a point given relative to the frame center (unscaled, unrotated) into
/// container space.
#[must_use]
pub fn project(frame: Rect, angle_deg: f64, scale: f64, local: Point) -> Point {
    let center = frame.center();
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let x = local.x * scale;
    let y = local.y * scale;
    Point::new(center.x + x * cos - y * sin, center.y + x * sin + y * cos)
}

/// Inverse of [`project`]. `None` when the scale cannot be inverted.
#[must_use]
pub fn unproject(frame: Rect, angle_deg: f64, scale: f64, pt: Point) -> Option<Point> {
    if !scale.is_finite() || scale.abs() <= f64::EPSILON {
        return None;
    }
    let center = frame.center();
    let (sin, cos) = (-angle_deg).to_radians().sin_cos();
    let dx = pt.x - center.x;
    let dy = pt.y - center.y;
    Some(Point::new((dx * cos - dy * sin) / scale, (dx * sin + dy * cos) / scale))
}

/// Angle in degrees of the ray from `from` to `to`, as `atan2` in screen
/// coordinates (clockwise-positive because y points down).
#[must_use]
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Wrap an angle delta into `(-180, 180]`.
#[must_use]
pub fn wrap_degrees(delta: f64) -> f64 {
    let mut wrapped = delta % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Round to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
