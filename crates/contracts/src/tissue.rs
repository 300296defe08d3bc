//! Tissue - closed set of segmentable knee tissues

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Anatomical tissue a model can segment.
///
/// Variant order is the canonical order used whenever all tissues are
/// requested; `Ord` follows it, so a [`TissueMap`] iterates canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tissue {
    FemoralCartilage,
    TibialCartilage,
    Meniscus,
    PatellarCartilage,
}

/// Per-tissue results keyed in canonical order
pub type TissueMap<T> = BTreeMap<Tissue, T>;

impl Tissue {
    /// Every tissue, canonical order
    pub const ALL: [Tissue; 4] = [
        Tissue::FemoralCartilage,
        Tissue::TibialCartilage,
        Tissue::Meniscus,
        Tissue::PatellarCartilage,
    ];

    /// Stable name, also used as output file stem
    pub fn as_str(&self) -> &'static str {
        match self {
            Tissue::FemoralCartilage => "femoral_cartilage",
            Tissue::TibialCartilage => "tibial_cartilage",
            Tissue::Meniscus => "meniscus",
            Tissue::PatellarCartilage => "patellar_cartilage",
        }
    }

    /// Output file name for a mask of this tissue
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.as_str(), extension)
    }
}

impl fmt::Display for Tissue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tissue {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tissue::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ContractError::Other(format!("unknown tissue '{s}'")))
    }
}
