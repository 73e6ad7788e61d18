//! Region primitives: points, quadrilaterals and axis-aligned bounding boxes.

use serde::{Deserialize, Serialize};

/// Pixel tolerance used when deciding whether two boxes touch.
pub const TOUCH_TOLERANCE: f64 = 2.0;

/// A 2D point in image pixel coordinates.
///
/// Serialized as a `[x, y]` pair, matching the shape text detectors emit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Four corners in the order top-left, top-right, bottom-right, bottom-left.
pub type Quad = [Point; 4];

/// Axis-aligned bounding box of a quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_y: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub max_x: f64,
}

impl BoundingBox {
    /// Extremes over all four corners, whatever the quadrilateral's distortion.
    pub fn from_quad(quad: &Quad) -> Self {
        let mut bbox = Self {
            min_y: quad[0].y,
            min_x: quad[0].x,
            max_y: quad[0].y,
            max_x: quad[0].x,
        };
        for p in &quad[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        bbox
    }

    /// `[minY, minX, maxY, maxX]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_y, self.min_x, self.max_y, self.max_x]
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_y: self.min_y.min(other.min_y),
            min_x: self.min_x.min(other.min_x),
            max_y: self.max_y.max(other.max_y),
            max_x: self.max_x.max(other.max_x),
        }
    }

    /// Rectangle corners as a quadrilateral in TL, TR, BR, BL order.
    pub fn to_quad(&self) -> Quad {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x && self.min_y <= other.min_y && self.max_x >= other.max_x && self.max_y >= other.max_y
    }

    /// Closed-interval intersection: sharing an edge counts.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.max_x < other.min_x || other.max_x < self.min_x {
            return false;
        }
        !(self.max_y < other.min_y || other.max_y < self.min_y)
    }

    /// Edges within `tolerance` along one axis while the other axis overlaps.
    pub fn touches(&self, other: &Self, tolerance: f64) -> bool {
        let h_overlap = self.min_x <= other.max_x && other.min_x <= self.max_x;
        let v_overlap = self.min_y <= other.max_y && other.min_y <= self.max_y;

        if h_overlap
            && ((self.max_y - other.min_y).abs() <= tolerance || (other.max_y - self.min_y).abs() <= tolerance)
        {
            return true;
        }
        v_overlap && ((self.max_x - other.min_x).abs() <= tolerance || (other.max_x - self.min_x).abs() <= tolerance)
    }

    /// Smallest distance between any x-extent of `self` and any x-extent of
    /// `other`, and likewise for y.
    pub fn edge_gaps(&self, other: &Self) -> (f64, f64) {
        let x_gap = [
            (self.min_x - other.min_x).abs(),
            (self.min_x - other.max_x).abs(),
            (self.max_x - other.min_x).abs(),
            (self.max_x - other.max_x).abs(),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min);
        let y_gap = [
            (self.min_y - other.min_y).abs(),
            (self.min_y - other.max_y).abs(),
            (self.max_y - other.min_y).abs(),
            (self.max_y - other.max_y).abs(),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min);
        (x_gap, y_gap)
    }
}

/// A detected text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub quad: Quad,
    pub text: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Output of the merge engine. Same shape as a raw [`Region`]: the quad is the
/// axis-extremal union of what it absorbed, the text is the absorbed texts
/// joined by single spaces, the confidence the maximum.
pub type MergedRegion = Region;

impl Region {
    pub fn new(quad: Quad, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Build an axis-aligned region from its top-left corner and size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64, text: impl Into<String>, confidence: f64) -> Self {
        let bbox = BoundingBox {
            min_y: y,
            min_x: x,
            max_y: y + height,
            max_x: x + width,
        };
        Self::new(bbox.to_quad(), text, confidence)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_quad(&self.quad)
    }

    pub fn top_left(&self) -> Point {
        self.quad[0]
    }
}
