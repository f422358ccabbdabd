//! Relation filter configuration.

use tether_core::CaseSensitivity;

/// Options controlling how a relation filter evaluates its expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Case handling for string comparisons and LIKE patterns.
    pub case_sensitivity: CaseSensitivity,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }
}
