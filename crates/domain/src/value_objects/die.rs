//! Hit die sizes.

use serde::{Deserialize, Serialize};

/// A hit die, persisted as its conventional name ("d8").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DieSize {
    #[serde(rename = "d6")]
    D6,
    #[default]
    #[serde(rename = "d8")]
    D8,
    #[serde(rename = "d10")]
    D10,
    #[serde(rename = "d12")]
    D12,
}

impl DieSize {
    pub fn faces(&self) -> i32 {
        match self {
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
        }
    }

    /// Average roll, rounded up (the per-level fixed HP option).
    pub fn average(&self) -> i32 {
        self.faces() / 2 + 1
    }
}

impl std::fmt::Display for DieSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.faces())
    }
}
