//! Allocation network topology: which (source, demand, month) triples
//! may carry water.

pub mod topology;
