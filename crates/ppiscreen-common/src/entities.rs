/// Core entity types shared by the loader, the feature builders and the models.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Molecule record
// ---------------------------------------------------------------------------

/// One row of the bioactivity table.
///
/// `descriptors` is aligned with the owning dataset's descriptor names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub row: usize,
    pub smiles: String,
    pub source: String,
    pub descriptors: Vec<f64>,
    pub potency: Option<f64>, // log-scaled, e.g. pIC50
}

// ---------------------------------------------------------------------------
// Potency label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotencyLabel {
    LessPotent,
    Potent,
}

impl PotencyLabel {
    pub const ALL: [PotencyLabel; 2] = [PotencyLabel::LessPotent, PotencyLabel::Potent];

    pub fn is_potent(self) -> bool {
        matches!(self, PotencyLabel::Potent)
    }

    /// 1.0 for potent, 0.0 otherwise.
    pub fn as_f64(self) -> f64 {
        if self.is_potent() { 1.0 } else { 0.0 }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PotencyLabel::LessPotent => "less_potent",
            PotencyLabel::Potent => "potent",
        }
    }
}

impl fmt::Display for PotencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
