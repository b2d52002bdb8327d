// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{ArrowType, EndpointKind};

/// Asks the user which kind of arrow to create.
///
/// Work mode offers the four work kinds, call mode only `Start` and `Group`.
pub trait ArrowTypePrompt {
    /// `None` means the user cancelled.
    fn choose(&mut self, kind: EndpointKind, choices: &[ArrowType], default: ArrowType) -> Option<ArrowType>;
}

/// Always answers with a fixed type (or cancels). Used by headless hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedArrowType(pub Option<ArrowType>);

impl ArrowTypePrompt for FixedArrowType {
    fn choose(&mut self, _kind: EndpointKind, _choices: &[ArrowType], _default: ArrowType) -> Option<ArrowType> {
        self.0
    }
}

/// Last prompted arrow type per mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrowTypeMemory {
    work: ArrowType,
    call: ArrowType,
}

impl ArrowTypeMemory {
    pub fn last(&self, kind: EndpointKind) -> ArrowType {
        let remembered = match kind {
            EndpointKind::Work => self.work,
            EndpointKind::Call => self.call,
        };
        normalize(remembered, kind)
    }

    /// Prompts with the remembered default and remembers a confirmed answer.
    pub fn prompt(&mut self, prompt: &mut dyn ArrowTypePrompt, kind: EndpointKind) -> Option<ArrowType> {
        let chosen = prompt.choose(kind, ArrowType::choices_for(kind), self.last(kind))?;
        let chosen = normalize(chosen, kind);
        match kind {
            EndpointKind::Work => self.work = chosen,
            EndpointKind::Call => self.call = chosen,
        }
        Some(chosen)
    }
}

fn normalize(arrow_type: ArrowType, kind: EndpointKind) -> ArrowType {
    if arrow_type.is_allowed_for(kind) {
        arrow_type
    } else {
        ArrowType::Start
    }
}
