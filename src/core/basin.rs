use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::demand::{Demand, DemandId, Sector};
use crate::core::source::{Source, SourceId};

/// Errors arising from run configuration.
///
/// These are the only fatal conditions in the pipeline: they abort a run
/// before any model is built. Solve outcomes (infeasible, unbounded,
/// timed out) are statuses, not errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown scenario '{name}' (available: {available})")]
    UnknownScenario { name: String, available: String },
    // thiserror treats a field named `source` as the error's cause.
    #[error("supply multiplier for '{source_id}' must be positive, got {value}")]
    NonPositiveMultiplier { source_id: SourceId, value: f64 },
    #[error("supply multiplier names unknown source '{0}'")]
    UnknownSource(SourceId),
}

/// A named set of conveyance-efficiency coefficients.
///
/// Each coefficient is the fraction of an allocated volume that actually
/// reaches the demand point, in (0, 1]. Exactly one scenario is active
/// per run. A demand absent from the table is treated as lossless
/// (efficiency 1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    efficiencies: HashMap<DemandId, f64>,
}

impl Scenario {
    /// Create a scenario.
    ///
    /// # Panics
    ///
    /// Panics if any coefficient is outside (0, 1].
    pub fn new(name: impl Into<String>, efficiencies: HashMap<DemandId, f64>) -> Self {
        let name = name.into();
        for (demand, eff) in &efficiencies {
            assert!(
                *eff > 0.0 && *eff <= 1.0,
                "scenario {}: efficiency for {} must be in (0, 1], got {}",
                name,
                demand,
                eff
            );
        }
        Self { name, efficiencies }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Conveyance efficiency for a demand. Lossless when unlisted.
    pub fn efficiency(&self, demand: &DemandId) -> f64 {
        self.efficiencies.get(demand).copied().unwrap_or(1.0)
    }
}

/// A group of local sources permitted to serve a single designated demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCluster {
    pub sources: Vec<SourceId>,
    pub demand: DemandId,
}

/// Immutable parameter table for one river basin.
///
/// Holds the supply profiles, demand profiles, unit costs and values,
/// the efficiency scenarios, and the fixed connectivity rules (one trunk
/// source serving every demand, plus local clusters restricted to their
/// designated demand). A `Basin` is built once and shared read-only by
/// any number of independent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basin {
    sources: Vec<Source>,
    demands: Vec<Demand>,
    trunk: SourceId,
    clusters: Vec<LocalCluster>,
    scenarios: Vec<Scenario>,
}

impl Basin {
    /// Assemble a basin from its parts.
    ///
    /// # Panics
    ///
    /// Panics if the trunk or any cluster member references an id that
    /// is not in the tables, or if a cluster reuses the trunk source.
    pub fn new(
        sources: Vec<Source>,
        demands: Vec<Demand>,
        trunk: SourceId,
        clusters: Vec<LocalCluster>,
        scenarios: Vec<Scenario>,
    ) -> Self {
        let has_source = |id: &SourceId| sources.iter().any(|s| s.id() == id);
        let has_demand = |id: &DemandId| demands.iter().any(|d| d.id() == id);

        assert!(has_source(&trunk), "trunk source {} not in table", trunk);
        for cluster in &clusters {
            assert!(
                has_demand(&cluster.demand),
                "cluster demand {} not in table",
                cluster.demand
            );
            for id in &cluster.sources {
                assert!(has_source(id), "cluster source {} not in table", id);
                assert!(
                    *id != trunk,
                    "trunk source {} cannot belong to a local cluster",
                    id
                );
            }
        }

        Self {
            sources,
            demands,
            trunk,
            clusters,
            scenarios,
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    pub fn source(&self, id: &SourceId) -> Option<&Source> {
        self.sources.iter().find(|s| s.id() == id)
    }

    pub fn demand(&self, id: &DemandId) -> Option<&Demand> {
        self.demands.iter().find(|d| d.id() == id)
    }

    /// The single source subject to the shared canal-capacity cap.
    pub fn trunk(&self) -> &SourceId {
        &self.trunk
    }

    pub fn clusters(&self) -> &[LocalCluster] {
        &self.clusters
    }

    /// Look up a scenario by name (case-insensitive).
    ///
    /// Fails fast: an unrecognized name aborts the run before any model
    /// construction starts.
    pub fn scenario(&self, name: &str) -> Result<&Scenario, ConfigError> {
        self.scenarios
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownScenario {
                name: name.to_string(),
                available: self
                    .scenarios
                    .iter()
                    .map(Scenario::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(Scenario::name).collect()
    }

    /// The default Chao–Virú basin dataset.
    ///
    /// Eight sources feed ten demands: the Santa river (trunk, behind a
    /// shared canal) can reach everything, while the tributaries, drains
    /// and well fields of each valley only serve their own valley's
    /// agricultural demand. Two efficiency scenarios are provided: S1
    /// (current conveyance) and S2 (improved canals in both valleys).
    pub fn chao_viru() -> Self {
        let sources = vec![
            Source::new(
                SourceId::new("SANTA"),
                [
                    17.59, 18.41, 17.29, 16.54, 16.36, 14.90, 11.72, 11.90, 11.55, 14.72, 18.06,
                    19.02,
                ],
                0.024820,
            ),
            Source::new(SourceId::new("HUAMANZANA"), [0.0; 12], 0.0017953),
            Source::new(
                SourceId::new("CHOROBAL"),
                [0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                0.0017953,
            ),
            Source::new(
                SourceId::new("VIRU-RIVER"),
                [0.21, 1.15, 2.01, 1.89, 0.57, 0.07, 0.03, 0.0, 0.0, 0.0, 0.0, 0.0],
                0.0018038,
            ),
            Source::new(
                SourceId::new("CHAO-DRAIN"),
                [0.53, 0.66, 0.50, 0.51, 0.52, 0.49, 0.49, 0.67, 0.94, 1.04, 1.04, 0.83],
                0.0017953,
            ),
            Source::new(
                SourceId::new("VIRU-DRAIN"),
                [0.61, 0.70, 0.63, 0.69, 0.62, 0.62, 0.57, 0.59, 0.59, 0.53, 0.65, 0.65],
                0.0018038,
            ),
            Source::new(
                SourceId::new("CHAO-WELLS"),
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.19, 0.22, 0.27, 0.24, 0.0, 0.0],
                0.0615100,
            ),
            Source::new(
                SourceId::new("VIRU-WELLS"),
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.15, 0.19, 0.22, 0.25, 0.23, 0.25, 0.19],
                0.0615100,
            ),
        ];

        let demands = vec![
            Demand::new(
                DemandId::new("CHAO"),
                [1.98, 1.82, 1.92, 1.88, 1.85, 1.79, 1.74, 2.72, 3.77, 4.16, 3.80, 3.14],
                0.0017953,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("VIRU"),
                [2.35, 2.76, 2.78, 2.99, 3.18, 3.15, 2.78, 2.93, 2.66, 2.77, 2.64, 3.22],
                0.0018038,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("SECTOR-1"),
                [4.60, 4.73, 4.49, 4.45, 3.98, 3.70, 2.88, 2.89, 2.99, 3.45, 4.31, 4.47],
                0.024820,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("SECTOR-2"),
                [0.92, 0.94, 0.90, 0.89, 0.79, 0.74, 0.57, 0.58, 0.60, 0.69, 0.86, 0.89],
                0.024820,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("SECTOR-3"),
                [2.83, 2.91, 2.77, 2.74, 2.45, 2.27, 1.77, 1.78, 1.84, 2.12, 2.65, 2.75],
                0.024820,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("SECTOR-4"),
                [3.18, 3.27, 3.11, 3.08, 2.75, 2.56, 1.99, 2.00, 2.07, 2.39, 2.98, 3.09],
                0.024820,
                Sector::Agriculture,
            ),
            Demand::new(
                DemandId::new("WTP-TRUJILLO"),
                [1.22, 1.14, 1.21, 1.11, 1.17, 1.18, 1.00, 1.11, 1.20, 1.23, 1.19, 1.21],
                0.028915,
                Sector::PotableTreatment,
            ),
            Demand::new(
                DemandId::new("WTP-CHAO"),
                [0.04, 0.04, 0.03, 0.04, 0.04, 0.04, 0.04, 0.03, 0.04, 0.04, 0.04, 0.04],
                0.028915,
                Sector::PotableTreatment,
            ),
            Demand::new(
                DemandId::new("INDUSTRY"),
                [0.50; 12],
                0.024820,
                Sector::IndustrialLivestock,
            ),
            Demand::new(
                DemandId::new("LIVESTOCK"),
                [0.60; 12],
                0.024820,
                Sector::IndustrialLivestock,
            ),
        ];

        let clusters = vec![
            LocalCluster {
                sources: vec![
                    SourceId::new("HUAMANZANA"),
                    SourceId::new("CHOROBAL"),
                    SourceId::new("CHAO-DRAIN"),
                    SourceId::new("CHAO-WELLS"),
                ],
                demand: DemandId::new("CHAO"),
            },
            LocalCluster {
                sources: vec![
                    SourceId::new("VIRU-RIVER"),
                    SourceId::new("VIRU-DRAIN"),
                    SourceId::new("VIRU-WELLS"),
                ],
                demand: DemandId::new("VIRU"),
            },
        ];

        let valley_eff = |chao: f64, sector: f64| -> HashMap<DemandId, f64> {
            let mut eff = HashMap::new();
            eff.insert(DemandId::new("CHAO"), chao);
            eff.insert(DemandId::new("VIRU"), chao);
            for s in ["SECTOR-1", "SECTOR-2", "SECTOR-3", "SECTOR-4"] {
                eff.insert(DemandId::new(s), sector);
            }
            for j in ["WTP-TRUJILLO", "WTP-CHAO", "INDUSTRY", "LIVESTOCK"] {
                eff.insert(DemandId::new(j), 1.0);
            }
            eff
        };

        let scenarios = vec![
            Scenario::new("S1", valley_eff(0.30, 0.89)),
            Scenario::new("S2", valley_eff(0.60, 0.95)),
        ];

        Basin::new(
            sources,
            demands,
            SourceId::new("SANTA"),
            clusters,
            scenarios,
        )
    }
}
