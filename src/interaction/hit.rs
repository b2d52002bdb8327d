// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;

use crate::config::EditorConfig;
use crate::geometry::distance_to_polyline;
use crate::model::{ArrowId, SelectionKey};
use crate::projection::CanvasProjection;
use crate::selection::SelectionEngine;

/// What sits under a canvas point, by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Start or end handle of a selected arrow.
    Handle {
        arrow_id: ArrowId,
        replace_source: bool,
    },
    Node(SelectionKey),
    Arrow(ArrowId),
    Empty,
}

/// Selected-arrow handles, then the topmost node, then an arrow line within tolerance.
pub fn hit_test(
    canvas: &CanvasProjection,
    selection: &SelectionEngine,
    point: DVec2,
    config: &EditorConfig,
) -> Hit {
    for arrow in canvas.arrows().iter().rev() {
        if !selection.is_arrow_selected(arrow.id) {
            continue;
        }
        if let Some(start) = arrow.path.start() {
            if start.distance(point) <= config.handle_radius {
                return Hit::Handle {
                    arrow_id: arrow.id,
                    replace_source: true,
                };
            }
        }
        if let Some(end) = arrow.path.end() {
            if end.distance(point) <= config.handle_radius {
                return Hit::Handle {
                    arrow_id: arrow.id,
                    replace_source: false,
                };
            }
        }
    }

    if let Some(node) = canvas.node_at(point) {
        return Hit::Node(node.key);
    }

    canvas
        .arrows()
        .iter()
        .rev()
        .map(|arrow| (arrow.id, distance_to_polyline(point, &arrow.path.points)))
        .filter(|(_, distance)| *distance <= config.hit_tolerance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(Hit::Empty, |(arrow_id, _)| Hit::Arrow(arrow_id))
}
