//! # basin-allocator
//!
//! River-basin water allocation and deficit optimization engine.
//!
//! Given monthly supply profiles for a set of physical sources and
//! monthly requirement profiles for a set of demand points, the engine
//! builds a linear program that maximizes net economic benefit while
//! respecting per-source supply limits, a shared canal throughput cap
//! on the trunk source, and hard zero-deficit rules for priority
//! (potable/industrial/livestock) demands.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: months, sources, demands, the basin
//!   parameter table and its efficiency scenarios
//! - **network** — The fixed allocation topology: which
//!   (source, demand, month) arcs may carry water
//! - **optimization** — LP assembly, solver backends, result extraction,
//!   and the run pipeline
//! - **report** — CSV/JSON persistence of run artifacts

pub mod core;
pub mod network;
pub mod optimization;
pub mod report;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::basin::{Basin, ConfigError, Scenario};
    pub use crate::core::demand::{Demand, DemandId, Sector};
    pub use crate::core::month::Month;
    pub use crate::core::source::{Source, SourceId};
    pub use crate::network::topology::NetworkTopology;
    pub use crate::optimization::engine::{AllocationEngine, RunParameters, SectorWeights};
    pub use crate::optimization::results::{
        AllocationOutcome, AllocationRecord, DeficitRecord, RunSummary,
    };
    pub use crate::optimization::solver::{SolveStatus, SolverChoice, SolverConfig};
}
