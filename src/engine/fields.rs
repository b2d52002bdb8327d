// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text forms of Work durations and Call timeouts, as typed into property fields.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use super::EditorError;

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^(\d{1,3}):([0-5]\d):([0-5]\d)$").expect("duration pattern is valid")
    })
}

/// Parses `hh:mm:ss`. Empty (or whitespace) text clears the duration.
pub fn parse_duration(text: &str) -> Result<Option<Duration>, EditorError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let invalid = || EditorError::InvalidDuration(text.to_owned());
    let captures = duration_regex().captures(text).ok_or_else(invalid)?;
    let field = |idx: usize| -> Result<u64, EditorError> {
        captures
            .get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(invalid)
    };
    let secs = field(1)? * 3600 + field(2)? * 60 + field(3)?;
    Ok(Some(Duration::from_secs(secs)))
}

pub fn format_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return String::new();
    };
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Parses a non-negative millisecond count. Empty text clears the timeout.
pub fn parse_timeout(text: &str) -> Result<Option<u32>, EditorError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u32>()
        .map(Some)
        .map_err(|_| EditorError::InvalidTimeout(text.to_owned()))
}

pub fn format_timeout(timeout_ms: Option<u32>) -> String {
    timeout_ms.map(|ms| ms.to_string()).unwrap_or_default()
}
