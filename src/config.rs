// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor tuning knobs.
//!
//! Every field has a default; a JSON config file only needs to name the values it overrides.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo entries kept before the oldest is evicted.
    pub max_undo_size: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// A box smaller than this in both dimensions counts as a click on empty space.
    pub click_threshold: f64,
    /// Minimum displacement (either axis) for a dragged node to produce a move.
    pub drag_epsilon: f64,
    pub fit_margin: f64,
    pub default_node_width: i32,
    pub default_node_height: i32,
    pub default_node_x: i32,
    pub default_node_y: i32,
    pub default_slot_gap: i32,
    pub default_slot_columns: usize,
    pub arrow_marker_size: f64,
    pub min_segment_length: f64,
    pub hit_tolerance: f64,
    pub handle_radius: f64,
    pub paste_offset: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_undo_size: 100,
            min_zoom: 0.2,
            max_zoom: 5.0,
            zoom_step: 0.1,
            click_threshold: 3.0,
            drag_epsilon: 0.1,
            fit_margin: 50.0,
            default_node_width: 120,
            default_node_height: 40,
            default_node_x: 50,
            default_node_y: 50,
            default_slot_gap: 40,
            default_slot_columns: 4,
            arrow_marker_size: 15.0,
            min_segment_length: 0.001,
            hit_tolerance: 4.0,
            handle_radius: 6.0,
            paste_offset: 20,
        }
    }
}

impl EditorConfig {
    /// Reads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range must satisfy 0 < min_zoom <= max_zoom (got {}..{})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoom_step must be positive".to_owned()));
        }
        if self.default_slot_columns == 0 {
            return Err(ConfigError::Invalid(
                "default_slot_columns must be at least 1".to_owned(),
            ));
        }
        if self.default_node_width <= 0 || self.default_node_height <= 0 {
            return Err(ConfigError::Invalid("default node size must be positive".to_owned()));
        }
        Ok(())
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
