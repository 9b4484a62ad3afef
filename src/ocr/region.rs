//! Line cluster to crop region reduction.

use image::DynamicImage;
use tracing::warn;

use crate::models::{LineCluster, LineRegion, Rect};

/// Reduces a line cluster to the axis-aligned envelope of its boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineRegionReducer;

impl LineRegionReducer {
    pub fn new() -> Self {
        Self
    }

    /// Envelope over every corner of every box in `cluster`.
    ///
    /// Zero or negative width or height (including an empty cluster)
    /// yields `LineRegion::Degenerate`.
    pub fn reduce(&self, cluster: &LineCluster) -> LineRegion {
        let corners = cluster.boxes().iter().flat_map(|b| b.points.iter());

        let mut rect = Rect {
            x_min: f32::INFINITY,
            y_min: f32::INFINITY,
            x_max: f32::NEG_INFINITY,
            y_max: f32::NEG_INFINITY,
        };
        for p in corners {
            rect.x_min = rect.x_min.min(p.x);
            rect.y_min = rect.y_min.min(p.y);
            rect.x_max = rect.x_max.max(p.x);
            rect.y_max = rect.y_max.max(p.y);
        }

        if rect.width() > 0.0 && rect.height() > 0.0 {
            LineRegion::Bounded(rect)
        } else {
            LineRegion::Degenerate
        }
    }
}

/// Crop `rect` out of `image`, clamped to the image bounds.
///
/// Returns `None` when nothing of the rectangle remains inside the image.
pub fn crop_region(image: &DynamicImage, rect: &Rect) -> Option<DynamicImage> {
    let (img_w, img_h) = (image.width(), image.height());

    let x0 = (rect.x_min.floor().max(0.0) as u32).min(img_w);
    let y0 = (rect.y_min.floor().max(0.0) as u32).min(img_h);
    let x1 = (rect.x_max.ceil().max(0.0) as u32).min(img_w);
    let y1 = (rect.y_max.ceil().max(0.0) as u32).min(img_h);

    if x1 <= x0 || y1 <= y0 {
        warn!(
            "Line region ({}, {})-({}, {}) lies outside the {}x{} image",
            rect.x_min, rect.y_min, rect.x_max, rect.y_max, img_w, img_h
        );
        return None;
    }

    Some(image.crop_imm(x0, y0, x1 - x0, y1 - y0))
}
