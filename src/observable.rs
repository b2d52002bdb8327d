// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// A value plus a revision counter that only moves when the value actually changes.
///
/// Views remember the last revision they rendered and compare with [`Observable::rev`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observable<T> {
    value: T,
    rev: u64,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self { value, rev: 0 }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn changed_since(&self, rev: u64) -> bool {
        self.rev != rev
    }

    /// Bumps the revision without comparing, for values without a cheap equality.
    pub fn touch(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }
}

impl<T: PartialEq> Observable<T> {
    /// Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.touch();
        true
    }
}
