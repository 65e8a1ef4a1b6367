use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::month::Month;

/// Unique identifier for a physical supply point.
///
/// A source can represent a river intake, a drain recovering return
/// flows, or a well field.
///
/// # Examples
///
/// ```
/// use basin_allocator::core::source::SourceId;
///
/// let santa = SourceId::new("SANTA");
/// let wells = SourceId::new("CHAO-WELLS");
/// assert_ne!(santa, wells);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A supply point with a monthly availability profile.
///
/// Holds the twelve-month flow-rate series (m³/s) and the unit cost of
/// extracting and releasing one m³ (USD/m³). Immutable once created;
/// a run never mutates basin data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    id: SourceId,
    /// Available flow per month, m³/s.
    flow_m3s: [f64; 12],
    /// Extraction cost, USD/m³.
    unit_cost_usd_m3: f64,
}

impl Source {
    /// Create a new source.
    ///
    /// # Panics
    ///
    /// Panics if any flow value or the unit cost is negative. A source
    /// with an all-zero series is valid: zero availability is a data
    /// condition, not a structural one.
    pub fn new(id: SourceId, flow_m3s: [f64; 12], unit_cost_usd_m3: f64) -> Self {
        assert!(
            flow_m3s.iter().all(|q| *q >= 0.0),
            "source {} has a negative flow entry",
            id
        );
        assert!(
            unit_cost_usd_m3 >= 0.0,
            "source {} has negative unit cost {}",
            id,
            unit_cost_usd_m3
        );
        Self {
            id,
            flow_m3s,
            unit_cost_usd_m3,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Available flow in the given month, m³/s.
    pub fn flow_m3s(&self, month: Month) -> f64 {
        self.flow_m3s[month.index()]
    }

    /// Available volume in the given month, hm³.
    pub fn volume_hm3(&self, month: Month) -> f64 {
        month.volume_hm3(self.flow_m3s(month))
    }

    pub fn unit_cost_usd_m3(&self) -> f64 {
        self.unit_cost_usd_m3
    }

    /// Extraction cost per hm³ released.
    pub fn unit_cost_usd_hm3(&self) -> f64 {
        self.unit_cost_usd_m3 * 1e6
    }
}
