use good_lp::solvers::minilp::minilp;
use good_lp::{Expression, ResolutionError, Solution, SolverModel, Variable};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::demand::DemandId;
use crate::core::month::Month;
use crate::optimization::model::{AllocationModel, ArcKey, ModelParts};

/// The LP backends the adapter knows how to drive.
///
/// `Cbc` is the COIN-OR branch-and-cut solver (behind the `cbc` cargo
/// feature, since it links a native library); `Simplex` is the
/// pure-Rust simplex backend that is always compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverChoice {
    Cbc,
    Simplex,
}

impl Default for SolverChoice {
    fn default() -> Self {
        SolverChoice::Cbc
    }
}

impl FromStr for SolverChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cbc" | "coin" | "coin_cbc" => Ok(SolverChoice::Cbc),
            "simplex" | "minilp" => Ok(SolverChoice::Simplex),
            other => Err(format!(
                "unknown solver '{}' (expected 'cbc' or 'simplex')",
                other
            )),
        }
    }
}

impl fmt::Display for SolverChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverChoice::Cbc => write!(f, "cbc"),
            SolverChoice::Simplex => write!(f, "simplex"),
        }
    }
}

/// How to drive the backend for one solve call.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub choice: SolverChoice,
    /// Wall-clock budget in seconds; unbounded when unset. Only the CBC
    /// backend honors it.
    pub time_limit_secs: Option<f64>,
    /// Let the backend print its own log.
    pub verbose: bool,
}

/// Outcome taxonomy of a solve attempt.
///
/// Infeasible, unbounded, and not-solved are legitimate outcomes, not
/// errors; the adapter surfaces whatever the backend reported without
/// retrying and without upgrading a timed-out result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend gave up (typically a time limit) without proving
    /// anything about the model.
    NotSolved,
    /// The backend returned without a usable objective value.
    Undefined,
}

impl SolveStatus {
    pub fn is_optimal(self) -> bool {
        self == SolveStatus::Optimal
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::NotSolved => "not_solved",
            SolveStatus::Undefined => "undefined",
        };
        write!(f, "{}", label)
    }
}

/// Solved variable values keyed back to the domain, plus the objective
/// evaluated against them.
///
/// A variable the backend never assigned reads as exactly 0.0; when no
/// solution exists the maps are empty and the objective is NaN.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective: f64,
    pub allocations: HashMap<ArcKey, f64>,
    pub deficits: HashMap<(DemandId, Month), f64>,
}

impl SolveOutcome {
    /// Allocated volume on an arc, 0.0 when absent or undefined.
    pub fn allocation(&self, key: &ArcKey) -> f64 {
        self.allocations.get(key).copied().unwrap_or(0.0)
    }

    /// Deficit volume for a demand and month, 0.0 when absent.
    pub fn deficit(&self, demand: &DemandId, month: Month) -> f64 {
        self.deficits
            .get(&(demand.clone(), month))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Run one synchronous solve attempt against the requested backend.
///
/// If CBC is requested but was not compiled in, the adapter logs a
/// warning and falls back to the simplex backend instead of failing the
/// run. Exactly one attempt is made; the call blocks for up to the
/// configured time limit.
pub fn solve(model: AllocationModel, config: &SolverConfig) -> SolveOutcome {
    let parts = model.into_parts();
    match config.choice {
        SolverChoice::Cbc => {
            #[cfg(feature = "cbc")]
            {
                solve_cbc(parts, config)
            }
            #[cfg(not(feature = "cbc"))]
            {
                warn!("CBC backend not compiled in (feature 'cbc'); falling back to simplex");
                solve_simplex(parts, config)
            }
        }
        SolverChoice::Simplex => solve_simplex(parts, config),
    }
}

fn solve_simplex(parts: ModelParts, config: &SolverConfig) -> SolveOutcome {
    if config.time_limit_secs.is_some() {
        debug!("simplex backend does not support a time limit; ignoring it");
    }
    if config.verbose {
        debug!("simplex backend has no message log; ignoring verbosity");
    }
    let ModelParts {
        variables,
        objective,
        constraints,
        x,
        u,
    } = parts;

    let mut problem = variables.maximise(objective.clone()).using(minilp);
    for c in constraints {
        problem = problem.with(c);
    }
    finish(problem.solve(), &objective, x, u)
}

#[cfg(feature = "cbc")]
fn solve_cbc(parts: ModelParts, config: &SolverConfig) -> SolveOutcome {
    use good_lp::solvers::coin_cbc::coin_cbc;

    let ModelParts {
        variables,
        objective,
        constraints,
        x,
        u,
    } = parts;

    let mut problem = variables.maximise(objective.clone()).using(coin_cbc);
    if let Some(limit) = config.time_limit_secs {
        problem.set_parameter("sec", &limit.to_string());
    }
    problem.set_parameter("logLevel", if config.verbose { "1" } else { "0" });
    for c in constraints {
        problem = problem.with(c);
    }
    finish(problem.solve(), &objective, x, u)
}

fn finish<S: Solution>(
    solved: Result<S, ResolutionError>,
    objective: &Expression,
    x: HashMap<ArcKey, Variable>,
    u: HashMap<(DemandId, Month), Variable>,
) -> SolveOutcome {
    match solved {
        Ok(solution) => {
            let allocations = x
                .into_iter()
                .map(|(key, var)| (key, finite_or_zero(solution.value(var))))
                .collect();
            let deficits = u
                .into_iter()
                .map(|(key, var)| (key, finite_or_zero(solution.value(var))))
                .collect();
            let objective = objective.eval_with(&solution);
            let status = if objective.is_finite() {
                SolveStatus::Optimal
            } else {
                SolveStatus::Undefined
            };
            SolveOutcome {
                status,
                objective,
                allocations,
                deficits,
            }
        }
        Err(err) => {
            let status = match err {
                ResolutionError::Infeasible => SolveStatus::Infeasible,
                ResolutionError::Unbounded => SolveStatus::Unbounded,
                other => {
                    warn!("solver stopped without a solution: {}", other);
                    SolveStatus::NotSolved
                }
            };
            SolveOutcome {
                status,
                objective: f64::NAN,
                allocations: HashMap::new(),
                deficits: HashMap::new(),
            }
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_choice_parsing() {
        assert_eq!("cbc".parse::<SolverChoice>().unwrap(), SolverChoice::Cbc);
        assert_eq!("CBC".parse::<SolverChoice>().unwrap(), SolverChoice::Cbc);
        assert_eq!(
            "simplex".parse::<SolverChoice>().unwrap(),
            SolverChoice::Simplex
        );
        assert_eq!(
            "minilp".parse::<SolverChoice>().unwrap(),
            SolverChoice::Simplex
        );
        assert!("glpk".parse::<SolverChoice>().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolveStatus::NotSolved.to_string(), "not_solved");
    }

    #[test]
    fn test_outcome_missing_values_read_zero() {
        let outcome = SolveOutcome {
            status: SolveStatus::Optimal,
            objective: 0.0,
            allocations: HashMap::new(),
            deficits: HashMap::new(),
        };
        assert_eq!(outcome.deficit(&DemandId::new("CHAO"), Month::Jan), 0.0);
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(1.5), 1.5);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
    }
}
