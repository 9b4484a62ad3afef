//! Detection geometry: word-level boxes, line clusters and line regions.

use serde::{Deserialize, Serialize};

/// A corner point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One detected text fragment: a quadrilateral plus the detector's reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    pub points: [Point; 4],
    pub text: String,
    pub confidence: f32,
}

impl DetectionBox {
    pub fn new(points: [Point; 4], text: impl Into<String>, confidence: f32) -> Self {
        Self {
            points,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned box from a top-left corner and a size.
    pub fn from_rect(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self::new(
            [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            confidence,
        )
    }

    pub fn min_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn min_y(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
    }

    pub fn max_y(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Vertical center, `(min_y + max_y) / 2`.
    pub fn center_y(&self) -> f32 {
        (self.min_y() + self.max_y()) / 2.0
    }
}

/// Boxes judged to lie on one visual line, with the mean of their vertical centers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCluster {
    boxes: Vec<DetectionBox>,
    center_y: f32,
}

impl LineCluster {
    pub fn new(first: DetectionBox) -> Self {
        let center_y = first.center_y();
        Self {
            boxes: vec![first],
            center_y,
        }
    }

    /// Append a box and recompute the mean center over every member.
    pub fn push(&mut self, b: DetectionBox) {
        self.boxes.push(b);
        let sum: f32 = self.boxes.iter().map(DetectionBox::center_y).sum();
        self.center_y = sum / self.boxes.len() as f32;
    }

    pub fn center_y(&self) -> f32 {
        self.center_y
    }

    pub fn boxes(&self) -> &[DetectionBox] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Member texts ordered left to right, joined by single spaces.
    pub fn text(&self) -> String {
        let mut ordered: Vec<&DetectionBox> = self.boxes.iter().collect();
        ordered.sort_by(|a, b| a.min_x().total_cmp(&b.min_x()));
        ordered
            .iter()
            .map(|b| b.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Axis-aligned crop rectangle for one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// The crop area for one line cluster, or a marker for zero-extent geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineRegion {
    Bounded(Rect),
    Degenerate,
}

impl LineRegion {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, LineRegion::Degenerate)
    }

    pub fn rect(&self) -> Option<&Rect> {
        match self {
            LineRegion::Bounded(r) => Some(r),
            LineRegion::Degenerate => None,
        }
    }
}
