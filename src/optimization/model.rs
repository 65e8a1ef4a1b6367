use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use itertools::iproduct;
use std::collections::HashMap;

use crate::core::basin::{Basin, Scenario};
use crate::core::demand::DemandId;
use crate::core::month::Month;
use crate::core::source::SourceId;
use crate::network::topology::NetworkTopology;
use crate::optimization::engine::RunParameters;

/// Key of an allocation variable: one valid (source, demand, month) arc.
pub type ArcKey = (SourceId, DemandId, Month);

/// The disassembled pieces of a built model, handed to the solver
/// adapter. The objective expression is kept alongside the variable
/// pool so the adapter can evaluate it against the solved values.
pub struct ModelParts {
    pub variables: ProblemVariables,
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub x: HashMap<ArcKey, Variable>,
    pub u: HashMap<(DemandId, Month), Variable>,
}

/// A fully assembled allocation LP for one run.
///
/// Variables:
/// - `x(i,j,m)` ≥ 0: volume (hm³) allocated along each valid arc;
/// - `u(j,m)` ≥ 0: shortfall (hm³) for every demand and month,
///   regardless of arc validity.
///
/// Constraints:
/// - demand balance, as an equality: delivered volume plus deficit must
///   exactly meet the requirement, so partial satisfaction always shows
///   up as a non-zero deficit;
/// - per-source monthly supply, as an inequality: unused supply is
///   simply not allocated;
/// - the shared canal cap on the trunk source, stacking with (not
///   replacing) the trunk's own supply rows;
/// - `u(j,m) == 0` for priority sectors. If a priority requirement
///   cannot be reached through the valid topology under the active
///   scenario, the model is legitimately infeasible.
///
/// Objective (maximize): net delivery margin minus the weighted deficit
/// penalty. Conveyance efficiency scales the value term only; the
/// source is charged for what it releases, not for what arrives.
pub struct AllocationModel {
    parts: ModelParts,
}

impl AllocationModel {
    /// Assemble variables, constraints, and the objective.
    ///
    /// Expressions are built by walking the topology and the basin
    /// tables in declaration order, so two builds of the same inputs
    /// produce the same model row for row.
    pub fn build(
        basin: &Basin,
        topology: &NetworkTopology,
        scenario: &Scenario,
        params: &RunParameters,
    ) -> Self {
        let mut vars = variables!();

        let mut x: HashMap<ArcKey, Variable> = HashMap::with_capacity(topology.len());
        for arc in topology.arcs() {
            let v = vars.add(variable().min(0.0));
            x.insert((arc.source.clone(), arc.demand.clone(), arc.month), v);
        }

        let mut u: HashMap<(DemandId, Month), Variable> =
            HashMap::with_capacity(basin.demands().len() * 12);
        for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
            u.insert((demand.id().clone(), month), vars.add(variable().min(0.0)));
        }

        let mut constraints = Vec::new();

        // Demand balance: delivered + deficit == requirement, exactly.
        for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
            let eff = scenario.efficiency(demand.id());
            let mut delivered = Expression::from(0.0);
            for source in basin.sources() {
                if let Some(v) = x.get(&(source.id().clone(), demand.id().clone(), month)) {
                    delivered += eff * *v;
                }
            }
            let deficit = u[&(demand.id().clone(), month)];
            constraints.push(constraint!(delivered + deficit == demand.volume_hm3(month)));
        }

        // Supply limits per source and month, with the run-level
        // multipliers scaling availability.
        for (source, month) in iproduct!(basin.sources(), Month::ALL) {
            let mut drawn = Expression::from(0.0);
            let mut has_arcs = false;
            for demand in basin.demands() {
                if let Some(v) = x.get(&(source.id().clone(), demand.id().clone(), month)) {
                    drawn += *v;
                    has_arcs = true;
                }
            }
            if !has_arcs {
                continue;
            }
            let available = source.volume_hm3(month) * params.multiplier(source.id());
            constraints.push(constraint!(drawn <= available));
        }

        // Shared canal throughput cap on the trunk source.
        for month in Month::ALL {
            let mut through = Expression::from(0.0);
            for demand in basin.demands() {
                if let Some(v) = x.get(&(basin.trunk().clone(), demand.id().clone(), month)) {
                    through += *v;
                }
            }
            let cap = month.volume_hm3(params.canal_capacity_m3s);
            constraints.push(constraint!(through <= cap));
        }

        // Priority sectors may not run a deficit.
        for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
            if demand.sector().is_priority() {
                let deficit = u[&(demand.id().clone(), month)];
                constraints.push(constraint!(deficit == 0.0));
            }
        }

        let cost_hm3: HashMap<&SourceId, f64> = basin
            .sources()
            .iter()
            .map(|s| (s.id(), s.unit_cost_usd_hm3()))
            .collect();
        let value_hm3: HashMap<&DemandId, f64> = basin
            .demands()
            .iter()
            .map(|d| (d.id(), d.unit_value_usd_hm3()))
            .collect();

        let mut margin = Expression::from(0.0);
        for arc in topology.arcs() {
            let eff = scenario.efficiency(&arc.demand);
            let coef = eff * value_hm3[&arc.demand] - cost_hm3[&arc.source];
            let v = x[&(arc.source.clone(), arc.demand.clone(), arc.month)];
            margin += coef * v;
        }

        let mut penalty = Expression::from(0.0);
        for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
            let weight = params.weights.for_sector(demand.sector());
            let v = u[&(demand.id().clone(), month)];
            penalty += params.penalty_usd_per_hm3 * weight * v;
        }

        let objective = margin - penalty;

        Self {
            parts: ModelParts {
                variables: vars,
                objective,
                constraints,
                x,
                u,
            },
        }
    }

    pub fn variable_count(&self) -> usize {
        self.parts.x.len() + self.parts.u.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.parts.constraints.len()
    }

    pub(crate) fn into_parts(self) -> ModelParts {
        self.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::engine::RunParameters;

    fn build_default() -> AllocationModel {
        let basin = Basin::chao_viru();
        let topology = NetworkTopology::build(&basin);
        let params = RunParameters::default();
        let scenario = basin.scenario(&params.scenario).unwrap();
        AllocationModel::build(&basin, &topology, scenario, &params)
    }

    #[test]
    fn test_variable_counts() {
        let model = build_default();
        // One x per arc (204) plus one u per demand-month (120).
        assert_eq!(model.variable_count(), 204 + 120);
    }

    #[test]
    fn test_constraint_counts() {
        let model = build_default();
        // 120 balance rows, 96 supply rows (8 sources x 12 months),
        // 12 canal rows, 48 priority zero-deficit rows.
        assert_eq!(model.constraint_count(), 120 + 96 + 12 + 48);
    }

    #[test]
    fn test_no_variable_for_invalid_arc() {
        let basin = Basin::chao_viru();
        let topology = NetworkTopology::build(&basin);
        let params = RunParameters::default();
        let scenario = basin.scenario(&params.scenario).unwrap();
        let model = AllocationModel::build(&basin, &topology, scenario, &params);

        let key = (
            SourceId::new("CHAO-WELLS"),
            DemandId::new("VIRU"),
            Month::Jan,
        );
        assert!(!model.parts.x.contains_key(&key));
    }

    #[test]
    fn test_deficit_variable_exists_for_every_demand_month() {
        let basin = Basin::chao_viru();
        let model = build_default();
        for (demand, month) in iproduct!(basin.demands(), Month::ALL) {
            assert!(model.parts.u.contains_key(&(demand.id().clone(), month)));
        }
    }
}
