// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;
use smallvec::SmallVec;

use super::{route, Polyline, Rect};
use crate::config::EditorConfig;
use crate::model::ArrowType;

/// One closed or open marker drawn on top of the arrow line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadShape {
    /// Open polyline `wing, tip, wing`.
    Kite([DVec2; 3]),
    /// Closed square, corners in drawing order.
    Square([DVec2; 4]),
}

pub type HeadGeometry = SmallVec<[HeadShape; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPath {
    pub points: Polyline,
    pub head: HeadGeometry,
}

impl ArrowPath {
    pub fn start(&self) -> Option<DVec2> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<DVec2> {
        self.points.last().copied()
    }
}

/// Routes an arrow between two node rectangles and derives its head geometry.
pub fn arrow_path(source: &Rect, target: &Rect, arrow_type: ArrowType, config: &EditorConfig) -> ArrowPath {
    let points = route(source, target);
    let head = head_geometry(
        arrow_type,
        &points,
        config.arrow_marker_size,
        config.min_segment_length,
    );
    ArrowPath { points, head }
}

/// Head markers for `arrow_type` along `points`.
///
/// `None` and `Group` never get a head. Every other kind gets a kite at the end. `StartReset`
/// adds a square at the start, `ResetReset` a backward kite there.
pub fn head_geometry(
    arrow_type: ArrowType,
    points: &[DVec2],
    marker_size: f64,
    min_segment_length: f64,
) -> HeadGeometry {
    let mut head = HeadGeometry::new();
    if points.len() < 2 || matches!(arrow_type, ArrowType::None | ArrowType::Group) {
        return head;
    }
    let Some(end_dir) = direction(points, true, min_segment_length) else {
        return head;
    };
    let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
        return head;
    };

    head.push(kite(end, end_dir, marker_size));
    match arrow_type {
        ArrowType::StartReset => {
            if let Some(forward) = direction(points, false, min_segment_length) {
                head.push(square(start, forward, marker_size * 0.5));
            }
        }
        ArrowType::ResetReset => {
            if let Some(forward) = direction(points, false, min_segment_length) {
                head.push(kite(start, -forward, marker_size));
            }
        }
        _ => {}
    }
    head
}

/// Unit direction of the last (or first) segment longer than `min_len`.
fn direction(points: &[DVec2], from_end: bool, min_len: f64) -> Option<DVec2> {
    let mut segments = points.windows(2).map(|pair| pair[1] - pair[0]);
    let segment = if from_end {
        segments.rev().find(|segment| segment.length() > min_len)
    } else {
        segments.find(|segment| segment.length() > min_len)
    }?;
    Some(segment.normalize())
}

fn kite(tip: DVec2, dir: DVec2, size: f64) -> HeadShape {
    let perp = dir.perp();
    let back = tip - dir * size * 0.55;
    HeadShape::Kite([back + perp * size * 0.4, tip, back - perp * size * 0.4])
}

fn square(start: DVec2, forward: DVec2, size: f64) -> HeadShape {
    let perp = forward.perp();
    let half = size * 0.5;
    let center = start + forward * half;
    HeadShape::Square([
        center + forward * half + perp * half,
        center + forward * half - perp * half,
        center - forward * half - perp * half,
        center - forward * half + perp * half,
    ])
}
