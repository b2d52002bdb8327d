// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas-space geometry: node rectangles, arrow routing and arrowhead shapes.

use glam::DVec2;
use smallvec::SmallVec;

use crate::model::Xywh;

mod arrow;

pub use arrow::{arrow_path, head_geometry, ArrowPath, HeadGeometry, HeadShape};

/// Points of an arrow line, in canvas units.
pub type Polyline = SmallVec<[DVec2; 4]>;

/// Axis-aligned rectangle; `min` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let min = DVec2::new(x, y);
        Self {
            min,
            max: min + DVec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    /// The rectangle spanned by two arbitrary corners, regardless of drag direction.
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Inclusive: rectangles that only touch along an edge intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Where the ray from the center toward `toward` leaves the rectangle.
    pub fn border_toward(&self, toward: DVec2) -> DVec2 {
        let center = self.center();
        let delta = toward - center;
        let half = (self.max - self.min) * 0.5;
        let mut scale = f64::INFINITY;
        if delta.x.abs() > f64::EPSILON {
            scale = scale.min(half.x / delta.x.abs());
        }
        if delta.y.abs() > f64::EPSILON {
            scale = scale.min(half.y / delta.y.abs());
        }
        if !scale.is_finite() {
            return center;
        }
        center + delta * scale.min(1.0)
    }
}

impl From<Xywh> for Rect {
    fn from(xywh: Xywh) -> Self {
        Self::new(
            f64::from(xywh.x),
            f64::from(xywh.y),
            f64::from(xywh.w),
            f64::from(xywh.h),
        )
    }
}

/// Straight route between two node rectangles, clipped to their borders.
pub fn route(source: &Rect, target: &Rect) -> Polyline {
    let start = source.border_toward(target.center());
    let end = target.border_toward(source.center());
    let mut points = Polyline::new();
    points.push(start);
    points.push(end);
    points
}

pub fn distance_to_segment(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

pub fn distance_to_polyline(point: DVec2, points: &[DVec2]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

#[cfg(test)]
mod tests;
