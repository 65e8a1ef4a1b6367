use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::basin::{Basin, Scenario};
use crate::core::demand::DemandId;
use crate::core::month::Month;
use crate::core::source::SourceId;
use crate::network::topology::NetworkTopology;
use crate::optimization::engine::RunParameters;
use crate::optimization::solver::{SolveOutcome, SolveStatus};

/// Reporting precision: volumes to six decimals, currency to two.
const VOLUME_DECIMALS: i32 = 6;
const CURRENCY_DECIMALS: i32 = 2;

/// One solved allocation along a valid arc.
///
/// `delivered_hm3` is the allocated volume scaled by the scenario's
/// conveyance efficiency; cost is charged on the released volume,
/// benefit is earned on the delivered one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub month: Month,
    pub source: SourceId,
    pub demand: DemandId,
    pub allocated_hm3: f64,
    pub delivered_hm3: f64,
    pub cost_usd: f64,
    pub benefit_usd: f64,
}

/// Shortfall for one demand in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeficitRecord {
    pub demand: DemandId,
    pub month: Month,
    pub deficit_hm3: f64,
}

/// Aggregate shortfall across all demands in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDeficit {
    pub month: Month,
    pub deficit_hm3: f64,
}

/// The run summary handed to persistence and the console report.
///
/// Benefit, cost, and penalty are recomputed here from the solved
/// variable values rather than copied from the solver, so
/// `objective ≈ benefit − cost − penalty` acts as a consistency check.
/// An undefined objective is NaN (serialized as JSON null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: SolveStatus,
    pub objective_usd: f64,
    pub benefit_usd: f64,
    pub cost_usd: f64,
    pub penalty_usd: f64,
    pub scenario: String,
    pub supply_multipliers: BTreeMap<String, f64>,
    pub canal_capacity_m3s: f64,
    pub penalty_usd_per_hm3: f64,
    pub deficits_hm3_by_month: Vec<MonthlyDeficit>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Allocation Summary ===")?;
        writeln!(f, "Status:     {}", self.status)?;
        writeln!(f, "Objective:  {:.2} USD", self.objective_usd)?;
        writeln!(f, "  Benefit:  {:.2} USD", self.benefit_usd)?;
        writeln!(f, "  Cost:     {:.2} USD", self.cost_usd)?;
        writeln!(f, "  Penalty:  {:.2} USD", self.penalty_usd)?;
        writeln!(f, "Scenario:   {}", self.scenario)?;
        writeln!(f, "\nDeficit by month (hm3):")?;
        for entry in &self.deficits_hm3_by_month {
            writeln!(f, "  {}: {}", entry.month, entry.deficit_hm3)?;
        }
        Ok(())
    }
}

/// Everything one run produces.
///
/// The totals here are unrounded for programmatic consumers; the
/// records and the summary carry the rounded reporting values.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub status: SolveStatus,
    pub objective: f64,
    pub benefit_total: f64,
    pub cost_total: f64,
    pub penalty_total: f64,
    pub allocations: Vec<AllocationRecord>,
    pub deficits: Vec<DeficitRecord>,
    pub summary: RunSummary,
}

/// Read solved values and assemble the three output structures.
///
/// Records are emitted in a deterministic order (month, then source,
/// then demand for allocations; demand table order, then month for
/// deficits). Rounding happens exactly once, here at the extraction
/// boundary.
pub fn extract(
    basin: &Basin,
    topology: &NetworkTopology,
    scenario: &Scenario,
    params: &RunParameters,
    solved: &SolveOutcome,
) -> AllocationOutcome {
    let mut benefit_total = 0.0;
    let mut cost_total = 0.0;

    let mut allocations = Vec::with_capacity(topology.len());
    for arc in topology.arcs() {
        let allocated = solved.allocation(&(arc.source.clone(), arc.demand.clone(), arc.month));
        let eff = scenario.efficiency(&arc.demand);
        let delivered = eff * allocated;

        // Lookups are total: the topology only references table entries.
        let unit_cost = basin
            .source(&arc.source)
            .map(|s| s.unit_cost_usd_hm3())
            .unwrap_or(0.0);
        let unit_value = basin
            .demand(&arc.demand)
            .map(|d| d.unit_value_usd_hm3())
            .unwrap_or(0.0);

        benefit_total += eff * unit_value * allocated;
        cost_total += unit_cost * allocated;

        allocations.push(AllocationRecord {
            month: arc.month,
            source: arc.source.clone(),
            demand: arc.demand.clone(),
            allocated_hm3: round_to(allocated, VOLUME_DECIMALS),
            delivered_hm3: round_to(delivered, VOLUME_DECIMALS),
            cost_usd: round_to(unit_cost * allocated, CURRENCY_DECIMALS),
            benefit_usd: round_to(unit_value * delivered, CURRENCY_DECIMALS),
        });
    }
    allocations.sort_by(|a, b| {
        (a.month.index(), &a.source, &a.demand).cmp(&(b.month.index(), &b.source, &b.demand))
    });

    let mut penalty_total = 0.0;
    let mut deficits = Vec::with_capacity(basin.demands().len() * 12);
    let mut by_month: Vec<f64> = vec![0.0; 12];
    for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
        let deficit = solved.deficit(demand.id(), month);
        by_month[month.index()] += deficit;
        penalty_total +=
            params.penalty_usd_per_hm3 * params.weights.for_sector(demand.sector()) * deficit;
        deficits.push(DeficitRecord {
            demand: demand.id().clone(),
            month,
            deficit_hm3: round_to(deficit, VOLUME_DECIMALS),
        });
    }

    let deficits_hm3_by_month = Month::ALL
        .iter()
        .map(|m| MonthlyDeficit {
            month: *m,
            deficit_hm3: round_to(by_month[m.index()], VOLUME_DECIMALS),
        })
        .collect();

    // Echo the effective multiplier of every source, not just the
    // overridden ones, so a default run still shows the wells at 1.0.
    let supply_multipliers = basin
        .sources()
        .iter()
        .map(|s| (s.id().as_str().to_string(), params.multiplier(s.id())))
        .collect();

    let summary = RunSummary {
        status: solved.status,
        objective_usd: round_to(solved.objective, CURRENCY_DECIMALS),
        benefit_usd: round_to(benefit_total, CURRENCY_DECIMALS),
        cost_usd: round_to(cost_total, CURRENCY_DECIMALS),
        penalty_usd: round_to(penalty_total, CURRENCY_DECIMALS),
        scenario: scenario.name().to_string(),
        supply_multipliers,
        canal_capacity_m3s: params.canal_capacity_m3s,
        penalty_usd_per_hm3: params.penalty_usd_per_hm3,
        deficits_hm3_by_month,
    };

    AllocationOutcome {
        status: solved.status,
        objective: solved.objective,
        benefit_total,
        cost_total,
        penalty_total,
        allocations,
        deficits,
        summary,
    }
}

/// Round to a fixed number of decimal places. NaN and infinities pass
/// through untouched so an undefined objective stays visible.
fn round_to(v: f64, decimals: i32) -> f64 {
    if !v.is_finite() {
        return v;
    }
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_volume_precision() {
        assert_eq!(round_to(1.23456789, 6), 1.234568);
        assert_eq!(round_to(2.5, 6), 2.5);
    }

    #[test]
    fn test_round_to_currency_precision() {
        assert_eq!(round_to(1234.5678, 2), 1234.57);
        assert_eq!(round_to(-0.005, 2), -0.01);
    }

    #[test]
    fn test_round_passes_nan_through() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_nan_objective_serializes_as_null() {
        let summary = RunSummary {
            status: SolveStatus::NotSolved,
            objective_usd: f64::NAN,
            benefit_usd: 0.0,
            cost_usd: 0.0,
            penalty_usd: 0.0,
            scenario: "S1".to_string(),
            supply_multipliers: BTreeMap::new(),
            canal_capacity_m3s: 88.0,
            penalty_usd_per_hm3: 1e8,
            deficits_hm3_by_month: Vec::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["objective_usd"].is_null());
    }
}
