//! Foundational types: months, sources, demands, and the basin
//! parameter table.

pub mod basin;
pub mod demand;
pub mod month;
pub mod source;
