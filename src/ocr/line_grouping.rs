//! Grouping of detection boxes into reading lines.
//!
//! Boxes are sorted top to bottom by their topmost corner. Each box joins the
//! current line when its vertical center lies within `tolerance` of the
//! line's mean center; otherwise the line is closed and a new one starts.
//! The mean is recomputed over all members after every join so long lines
//! with many fragments do not drift.

use tracing::debug;

use crate::models::{DetectionBox, LineCluster};

/// Default vertical tolerance, in pixels.
pub const DEFAULT_LINE_TOLERANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct LineClusterer {
    tolerance: f32,
}

impl Default for LineClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_TOLERANCE)
    }
}

impl LineClusterer {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Cluster `boxes` into lines ordered top to bottom.
    pub fn cluster(&self, mut boxes: Vec<DetectionBox>) -> Vec<LineCluster> {
        boxes.sort_by(|a, b| a.min_y().total_cmp(&b.min_y()));

        let mut lines = Vec::new();
        let mut current: Option<LineCluster> = None;

        for b in boxes {
            match current.as_mut() {
                Some(line) if (b.center_y() - line.center_y()).abs() <= self.tolerance => {
                    line.push(b);
                }
                _ => {
                    if let Some(done) = current.replace(LineCluster::new(b)) {
                        lines.push(done);
                    }
                }
            }
        }
        if let Some(done) = current {
            lines.push(done);
        }

        debug!(
            "Grouped boxes into {} line(s) with tolerance {}",
            lines.len(),
            self.tolerance
        );
        lines
    }
}
