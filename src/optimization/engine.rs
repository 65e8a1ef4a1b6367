use log::{debug, info};
use std::collections::HashMap;

use crate::core::basin::{Basin, ConfigError};
use crate::core::demand::Sector;
use crate::core::source::SourceId;
use crate::network::topology::NetworkTopology;
use crate::optimization::model::AllocationModel;
use crate::optimization::results::{self, AllocationOutcome};
use crate::optimization::solver::{self, SolverConfig};

/// Deficit-penalty weights per sector.
///
/// These are policy multipliers on the per-unit penalty rate, not
/// prices: the penalty term for a demand is
/// `penalty_rate × sector_weight × deficit`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorWeights {
    pub potable_treatment: f64,
    pub industrial_livestock: f64,
    pub agriculture: f64,
}

impl SectorWeights {
    pub fn for_sector(&self, sector: Sector) -> f64 {
        match sector {
            Sector::PotableTreatment => self.potable_treatment,
            Sector::IndustrialLivestock => self.industrial_livestock,
            Sector::Agriculture => self.agriculture,
        }
    }
}

impl Default for SectorWeights {
    fn default() -> Self {
        Self {
            potable_treatment: 100.0,
            industrial_livestock: 50.0,
            agriculture: 1.0,
        }
    }
}

/// Run-level parameters for one allocation run.
///
/// Everything here is a scalar knob on top of the immutable basin
/// tables; a fresh model is built from the combination on every run and
/// discarded after extraction.
#[derive(Debug, Clone)]
pub struct RunParameters {
    /// Name of the active efficiency scenario.
    pub scenario: String,
    /// What-if supply multipliers per source; absent means 1.0. Used to
    /// scale the two well fields without touching base data.
    pub supply_multipliers: HashMap<SourceId, f64>,
    /// Penalty rate per hm³ of weighted deficit, USD.
    pub penalty_usd_per_hm3: f64,
    pub weights: SectorWeights,
    /// Throughput cap of the shared trunk canal, m³/s.
    pub canal_capacity_m3s: f64,
    pub solver: SolverConfig,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            scenario: "S1".to_string(),
            supply_multipliers: HashMap::new(),
            penalty_usd_per_hm3: 1e8,
            weights: SectorWeights::default(),
            canal_capacity_m3s: 88.0,
            solver: SolverConfig::default(),
        }
    }
}

impl RunParameters {
    /// Supply multiplier for a source (1.0 unless overridden).
    pub fn multiplier(&self, source: &SourceId) -> f64 {
        self.supply_multipliers.get(source).copied().unwrap_or(1.0)
    }

    /// Override the supply multiplier of one source.
    pub fn with_multiplier(mut self, source: SourceId, value: f64) -> Self {
        self.supply_multipliers.insert(source, value);
        self
    }

    fn validate(&self, basin: &Basin) -> Result<(), ConfigError> {
        for (source, value) in &self.supply_multipliers {
            if basin.source(source).is_none() {
                return Err(ConfigError::UnknownSource(source.clone()));
            }
            if *value <= 0.0 {
                return Err(ConfigError::NonPositiveMultiplier {
                    source_id: source.clone(),
                    value: *value,
                });
            }
        }
        Ok(())
    }
}

/// The allocation pipeline.
///
/// One synchronous pass: validate configuration, enumerate the
/// topology, build the LP, solve once, extract. No state survives a
/// run, so concurrent scenario exploration just means independent
/// calls with independent parameter snapshots.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Run the full pipeline against a basin.
    ///
    /// Fails only on configuration errors (unknown scenario, bad
    /// multiplier), and fails before any model is built. Infeasible or
    /// timed-out solves still return a complete, status-tagged outcome.
    pub fn run(basin: &Basin, params: &RunParameters) -> Result<AllocationOutcome, ConfigError> {
        params.validate(basin)?;
        let scenario = basin.scenario(&params.scenario)?;

        let topology = NetworkTopology::build(basin);
        info!(
            "scenario {}: {} sources, {} demands, {} arcs",
            scenario.name(),
            basin.sources().len(),
            basin.demands().len(),
            topology.len()
        );

        let model = AllocationModel::build(basin, &topology, scenario, params);
        debug!(
            "model built: {} variables, {} constraints",
            model.variable_count(),
            model.constraint_count()
        );

        let solved = solver::solve(model, &params.solver);
        info!(
            "solve finished with status {} (objective {})",
            solved.status, solved.objective
        );

        Ok(results::extract(basin, &topology, scenario, params, &solved))
    }
}
