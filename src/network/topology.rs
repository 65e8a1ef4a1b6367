use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::basin::Basin;
use crate::core::demand::DemandId;
use crate::core::month::Month;
use crate::core::source::SourceId;

/// A permitted (source, demand, month) allocation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationArc {
    pub source: SourceId,
    pub demand: DemandId,
    pub month: Month,
}

/// The set of valid allocation arcs for a basin.
///
/// Built from two closed connectivity rules:
///
/// 1. the trunk source connects to every demand in every month;
/// 2. each local cluster's sources connect only to that cluster's
///    designated demand, in every month.
///
/// Any (source, demand) pair not covered by a rule gets no allocation
/// variable at all, which implicitly forces its flow to zero. The arc
/// set does not depend on the active scenario or on supply multipliers,
/// and a source or demand whose series is zero all year is still wired
/// in: zero availability is a data condition, not a topology condition.
#[derive(Debug, Clone)]
pub struct NetworkTopology {
    arcs: Vec<AllocationArc>,
    index: HashSet<(SourceId, DemandId, Month)>,
}

impl NetworkTopology {
    /// Enumerate the valid arcs of a basin.
    pub fn build(basin: &Basin) -> Self {
        let mut arcs = Vec::new();

        for demand in basin.demands() {
            for month in Month::ALL {
                arcs.push(AllocationArc {
                    source: basin.trunk().clone(),
                    demand: demand.id().clone(),
                    month,
                });
            }
        }

        for cluster in basin.clusters() {
            for source in &cluster.sources {
                for month in Month::ALL {
                    arcs.push(AllocationArc {
                        source: source.clone(),
                        demand: cluster.demand.clone(),
                        month,
                    });
                }
            }
        }

        let index = arcs
            .iter()
            .map(|a| (a.source.clone(), a.demand.clone(), a.month))
            .collect();

        Self { arcs, index }
    }

    /// All valid arcs, in a deterministic order (trunk arcs first, then
    /// cluster arcs in declaration order).
    pub fn arcs(&self) -> &[AllocationArc] {
        &self.arcs
    }

    /// Whether a (source, demand, month) triple is a valid arc.
    pub fn is_valid(&self, source: &SourceId, demand: &DemandId, month: Month) -> bool {
        self.index
            .contains(&(source.clone(), demand.clone(), month))
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_basin_arc_count() {
        // Trunk: 10 demands x 12 months. Clusters: (4 + 3) sources x 12.
        let basin = Basin::chao_viru();
        let topo = NetworkTopology::build(&basin);
        assert_eq!(topo.len(), 10 * 12 + 7 * 12);
    }

    #[test]
    fn test_trunk_reaches_every_demand() {
        let basin = Basin::chao_viru();
        let topo = NetworkTopology::build(&basin);
        for demand in basin.demands() {
            for month in Month::ALL {
                assert!(topo.is_valid(basin.trunk(), demand.id(), month));
            }
        }
    }

    #[test]
    fn test_cluster_sources_serve_only_their_valley() {
        let basin = Basin::chao_viru();
        let topo = NetworkTopology::build(&basin);
        let wells = SourceId::new("CHAO-WELLS");

        for month in Month::ALL {
            assert!(topo.is_valid(&wells, &DemandId::new("CHAO"), month));
            assert!(!topo.is_valid(&wells, &DemandId::new("VIRU"), month));
            assert!(!topo.is_valid(&wells, &DemandId::new("WTP-TRUJILLO"), month));
        }
    }

    #[test]
    fn test_zero_supply_source_still_wired() {
        let basin = Basin::chao_viru();
        let topo = NetworkTopology::build(&basin);
        // HUAMANZANA has an all-zero series yet keeps its arcs to CHAO.
        for month in Month::ALL {
            assert!(topo.is_valid(
                &SourceId::new("HUAMANZANA"),
                &DemandId::new("CHAO"),
                month
            ));
        }
    }

    #[test]
    fn test_arc_order_is_deterministic() {
        let basin = Basin::chao_viru();
        let a = NetworkTopology::build(&basin);
        let b = NetworkTopology::build(&basin);
        assert_eq!(a.arcs(), b.arcs());
    }
}
