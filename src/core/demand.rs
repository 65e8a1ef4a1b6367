use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::month::Month;

/// Unique identifier for a demand point.
///
/// # Examples
///
/// ```
/// use basin_allocator::core::demand::DemandId;
///
/// let chao = DemandId::new("CHAO");
/// let wtp = DemandId::new("WTP-TRUJILLO");
/// assert_ne!(chao, wtp);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandId(String);

impl DemandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DemandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DemandId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Sector classification of a demand point.
///
/// The sector decides two things: the weight its deficit carries in the
/// objective penalty, and whether shortfall is forbidden outright.
/// Potable-treatment and industrial/livestock demands are priority
/// sectors: their deficit variables are pinned to zero as hard
/// constraints, so a basin that cannot reach them is infeasible rather
/// than penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Agriculture,
    PotableTreatment,
    IndustrialLivestock,
}

impl Sector {
    /// Whether deficit is forbidden (hard zero) for this sector.
    pub fn is_priority(self) -> bool {
        matches!(self, Sector::PotableTreatment | Sector::IndustrialLivestock)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sector::Agriculture => "agriculture",
            Sector::PotableTreatment => "potable_treatment",
            Sector::IndustrialLivestock => "industrial_livestock",
        };
        write!(f, "{}", label)
    }
}

/// A consumption point with a monthly requirement profile.
///
/// Holds the twelve-month requirement series (m³/s), the economic value
/// of one delivered m³ (USD/m³), and the sector classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    id: DemandId,
    /// Required flow per month, m³/s.
    requirement_m3s: [f64; 12],
    /// Value of delivered water, USD/m³.
    unit_value_usd_m3: f64,
    sector: Sector,
}

impl Demand {
    /// Create a new demand.
    ///
    /// # Panics
    ///
    /// Panics if any requirement or the unit value is negative.
    pub fn new(
        id: DemandId,
        requirement_m3s: [f64; 12],
        unit_value_usd_m3: f64,
        sector: Sector,
    ) -> Self {
        assert!(
            requirement_m3s.iter().all(|q| *q >= 0.0),
            "demand {} has a negative requirement entry",
            id
        );
        assert!(
            unit_value_usd_m3 >= 0.0,
            "demand {} has negative unit value {}",
            id,
            unit_value_usd_m3
        );
        Self {
            id,
            requirement_m3s,
            unit_value_usd_m3,
            sector,
        }
    }

    pub fn id(&self) -> &DemandId {
        &self.id
    }

    /// Required flow in the given month, m³/s.
    pub fn requirement_m3s(&self, month: Month) -> f64 {
        self.requirement_m3s[month.index()]
    }

    /// Required volume in the given month, hm³.
    pub fn volume_hm3(&self, month: Month) -> f64 {
        month.volume_hm3(self.requirement_m3s(month))
    }

    pub fn unit_value_usd_m3(&self) -> f64 {
        self.unit_value_usd_m3
    }

    /// Value per hm³ delivered.
    pub fn unit_value_usd_hm3(&self) -> f64 {
        self.unit_value_usd_m3 * 1e6
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }
}
