//! The allocation LP: model assembly, solver adapter, result
//! extraction, and the pipeline that ties them together.

pub mod engine;
pub mod model;
pub mod results;
pub mod solver;
