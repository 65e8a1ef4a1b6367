use basin_allocator::core::basin::Basin;
use basin_allocator::core::month::Month;
use basin_allocator::core::source::SourceId;
use basin_allocator::optimization::engine::{AllocationEngine, RunParameters};
use basin_allocator::optimization::solver::SolveStatus;
use proptest::prelude::*;
use std::collections::HashMap;

/// Records carry six rounded decimals, so reconstructed sums drift a
/// little below LP precision.
const TOL: f64 = 1e-3;

/// Generate a supply multiplier in a range where the model stays
/// feasible (priority demands never depend on the well fields).
fn arb_multiplier() -> impl Strategy<Value = f64> {
    0.5f64..3.0
}

/// Pick one of the two bundled efficiency scenarios.
fn arb_scenario() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["S1".to_string(), "S2".to_string()])
}

/// Penalty rates from "off" to the default policy rate.
fn arb_penalty() -> impl Strategy<Value = f64> {
    prop::sample::select(vec![0.0, 1e4, 1e6, 1e8])
}

fn arb_params() -> impl Strategy<Value = RunParameters> {
    (arb_scenario(), arb_multiplier(), arb_multiplier(), arb_penalty()).prop_map(
        |(scenario, chao_mult, viru_mult, penalty)| {
            RunParameters {
                scenario,
                penalty_usd_per_hm3: penalty,
                ..Default::default()
            }
            .with_multiplier(SourceId::new("CHAO-WELLS"), chao_mult)
            .with_multiplier(SourceId::new("VIRU-WELLS"), viru_mult)
        },
    )
}

proptest! {
    // Each case solves a full LP, so keep the case count small.
    #![proptest_config(ProptestConfig::with_cases(12))]

    // ===================================================================
    // INVARIANT 1: Demand balance.
    //
    // For every (demand, month), delivered water plus the recorded
    // deficit equals the monthly requirement exactly (the balance row
    // is an equality constraint).
    // ===================================================================
    #[test]
    fn demand_balance_always_holds(params in arb_params()) {
        let basin = Basin::chao_viru();
        let outcome = AllocationEngine::run(&basin, &params).unwrap();
        prop_assert_eq!(outcome.status, SolveStatus::Optimal);

        let mut delivered: HashMap<(String, Month), f64> = HashMap::new();
        for record in &outcome.allocations {
            *delivered
                .entry((record.demand.as_str().to_string(), record.month))
                .or_insert(0.0) += record.delivered_hm3;
        }

        for record in &outcome.deficits {
            let demand = basin.demand(&record.demand).unwrap();
            let served = delivered
                .get(&(record.demand.as_str().to_string(), record.month))
                .copied()
                .unwrap_or(0.0);
            let requirement = demand.volume_hm3(record.month);
            prop_assert!(
                (served + record.deficit_hm3 - requirement).abs() < TOL,
                "{} {} imbalance: {} + {} != {}",
                record.demand, record.month, served, record.deficit_hm3, requirement
            );
        }
    }

    // ===================================================================
    // INVARIANT 2: Supply limits and the canal cap.
    //
    // No source ever releases more than its (multiplier-scaled) monthly
    // volume, and trunk releases fit through the shared canal.
    // ===================================================================
    #[test]
    fn physical_limits_always_hold(params in arb_params()) {
        let basin = Basin::chao_viru();
        let outcome = AllocationEngine::run(&basin, &params).unwrap();
        prop_assert_eq!(outcome.status, SolveStatus::Optimal);

        let mut released: HashMap<(SourceId, Month), f64> = HashMap::new();
        for record in &outcome.allocations {
            prop_assert!(record.allocated_hm3 >= -TOL);
            *released
                .entry((record.source.clone(), record.month))
                .or_insert(0.0) += record.allocated_hm3;
        }

        for source in basin.sources() {
            for month in Month::ALL {
                let used = released
                    .get(&(source.id().clone(), month))
                    .copied()
                    .unwrap_or(0.0);
                let available =
                    source.volume_hm3(month) * params.multiplier(source.id());
                prop_assert!(
                    used <= available + TOL,
                    "{} over-released in {}",
                    source.id(), month
                );
            }
        }

        for month in Month::ALL {
            let through: f64 = outcome
                .allocations
                .iter()
                .filter(|r| &r.source == basin.trunk() && r.month == month)
                .map(|r| r.allocated_hm3)
                .sum();
            prop_assert!(
                through <= month.volume_hm3(params.canal_capacity_m3s) + TOL,
                "canal overrun in {}", month
            );
        }
    }

    // ===================================================================
    // INVARIANT 3: Priority demands are always fully served.
    //
    // The zero-deficit rows are hard constraints, independent of the
    // penalty rate and the scenario.
    // ===================================================================
    #[test]
    fn priority_demands_always_served(params in arb_params()) {
        let basin = Basin::chao_viru();
        let outcome = AllocationEngine::run(&basin, &params).unwrap();
        prop_assert_eq!(outcome.status, SolveStatus::Optimal);

        for record in &outcome.deficits {
            let demand = basin.demand(&record.demand).unwrap();
            if demand.sector().is_priority() {
                prop_assert!(
                    record.deficit_hm3.abs() < TOL,
                    "priority demand {} short in {}",
                    record.demand, record.month
                );
            }
        }
    }

    // ===================================================================
    // INVARIANT 4: The objective reconciles with the recomputed totals.
    //
    // benefit − cost − penalty, rebuilt from solved variable values,
    // matches the objective the solver reported.
    // ===================================================================
    #[test]
    fn objective_always_reconciles(params in arb_params()) {
        let basin = Basin::chao_viru();
        let outcome = AllocationEngine::run(&basin, &params).unwrap();
        prop_assert_eq!(outcome.status, SolveStatus::Optimal);

        let recomputed =
            outcome.benefit_total - outcome.cost_total - outcome.penalty_total;
        let scale = outcome.objective.abs().max(1.0);
        prop_assert!(
            (outcome.objective - recomputed).abs() / scale < 1e-6,
            "objective {} vs recomputed {}",
            outcome.objective, recomputed
        );
    }

    // ===================================================================
    // INVARIANT 5: Determinism.
    //
    // Identical parameters always reproduce identical records.
    // ===================================================================
    #[test]
    fn runs_are_deterministic(params in arb_params()) {
        let basin = Basin::chao_viru();
        let a = AllocationEngine::run(&basin, &params).unwrap();
        let b = AllocationEngine::run(&basin, &params).unwrap();
        prop_assert_eq!(a.allocations, b.allocations);
        prop_assert_eq!(a.deficits, b.deficits);
        prop_assert_eq!(a.summary, b.summary);
    }
}
