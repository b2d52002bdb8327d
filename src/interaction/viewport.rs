// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::DVec2;

use crate::config::EditorConfig;
use crate::geometry::Rect;

/// Camera state for a canvas: `screen = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen-space translation.
    pub pan: DVec2,
    /// 1.0 = 100%.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: DVec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen_to_canvas(&self, screen: DVec2) -> DVec2 {
        (screen - self.pan) / self.zoom
    }

    pub fn canvas_to_screen(&self, canvas: DVec2) -> DVec2 {
        canvas * self.zoom + self.pan
    }

    pub fn pan_by(&mut self, screen_delta: DVec2) {
        self.pan += screen_delta;
    }

    /// Sets the zoom, keeping the canvas point under `screen` fixed. Returns `false` when the
    /// clamped zoom is effectively unchanged.
    pub fn zoom_at(&mut self, screen: DVec2, zoom: f64, config: &EditorConfig) -> bool {
        let zoom = config.clamp_zoom(zoom);
        if (zoom - self.zoom).abs() < 0.001 {
            return false;
        }
        let scale = zoom / self.zoom;
        self.pan = screen - (screen - self.pan) * scale;
        self.zoom = zoom;
        true
    }

    /// One wheel notch: a fixed step in or out around the pointer.
    pub fn wheel(&mut self, screen: DVec2, zoom_in: bool, config: &EditorConfig) -> bool {
        let step = if zoom_in { config.zoom_step } else { -config.zoom_step };
        self.zoom_at(screen, self.zoom + step, config)
    }

    /// Toolbar zoom: clamped, without recentering.
    pub fn set_zoom(&mut self, zoom: f64, config: &EditorConfig) {
        self.zoom = config.clamp_zoom(zoom);
    }

    pub fn zoom_in(&mut self, config: &EditorConfig) {
        self.set_zoom(self.zoom + config.zoom_step, config);
    }

    pub fn zoom_out(&mut self, config: &EditorConfig) {
        self.set_zoom(self.zoom - config.zoom_step, config);
    }

    pub fn reset_zoom(&mut self, config: &EditorConfig) {
        self.set_zoom(1.0, config);
    }

    /// Fits `content` plus a margin on every side into a `view`-sized screen area.
    pub fn fit(&mut self, content: Rect, view: DVec2, config: &EditorConfig) -> bool {
        if view.x <= 0.0 || view.y <= 0.0 {
            return false;
        }
        let margin = config.fit_margin;
        let size = DVec2::new(content.width(), content.height()) + DVec2::splat(margin * 2.0);
        let ratio = view / size;
        self.zoom = config.clamp_zoom(ratio.x.min(ratio.y));
        self.pan = (view - size * self.zoom) * 0.5 - content.min * self.zoom + DVec2::splat(margin * self.zoom);
        true
    }

    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0) as i32
    }
}
