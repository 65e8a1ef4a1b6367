//! basin-allocator CLI
//!
//! Run the water-allocation optimizer from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Solve the default dataset under scenario S1
//! basin-allocator solve --scenario S1
//!
//! # What-if: scale both well fields, write artifacts to a directory
//! basin-allocator solve --scenario S2 --chao-wells-mult 1.5 \
//!     --viru-wells-mult 1.2 --out out_run
//!
//! # Print the summary as JSON
//! basin-allocator solve --format json
//!
//! # List the available efficiency scenarios
//! basin-allocator scenarios
//! ```

use basin_allocator::core::basin::Basin;
use basin_allocator::core::source::SourceId;
use basin_allocator::optimization::engine::{AllocationEngine, RunParameters};
use basin_allocator::optimization::solver::SolverChoice;
use basin_allocator::report;
use std::path::PathBuf;
use std::process;

fn print_usage() {
    eprintln!(
        r#"basin-allocator — river-basin water allocation and deficit optimization

USAGE:
    basin-allocator <COMMAND> [OPTIONS]

COMMANDS:
    solve       Build and solve the allocation model
    scenarios   List the available efficiency scenarios
    help        Show this message

OPTIONS (solve):
    --scenario <NAME>          Efficiency scenario (default: S1)
    --chao-wells-mult <X>      Supply multiplier for CHAO-WELLS (default: 1.0)
    --viru-wells-mult <X>      Supply multiplier for VIRU-WELLS (default: 1.0)
    --penalty <USD>            Penalty per hm3 of weighted deficit (default: 1e8)
    --weight-potable <X>       Deficit weight for potable treatment (default: 100)
    --weight-industrial <X>    Deficit weight for industry/livestock (default: 50)
    --weight-agriculture <X>   Deficit weight for agriculture (default: 1)
    --canal-cap <M3S>          Trunk canal capacity in m3/s (default: 88)
    --solver <NAME>            LP backend: cbc or simplex (default: cbc)
    --time-limit <SECS>        Solver wall-clock budget (default: unbounded)
    --solver-verbose           Let the backend print its own log
    --out <DIR>                Artifact directory (default: out)
    --format <FORMAT>          Console output: text (default) or json

EXAMPLES:
    basin-allocator solve
    basin-allocator solve --scenario S2 --canal-cap 70
    basin-allocator solve --penalty 0 --format json
    basin-allocator solve --chao-wells-mult 2.0 --out out_run"#
    );
}

fn parse_f64(args: &[String], i: usize, flag: &str) -> f64 {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} requires a number", flag);
            process::exit(1);
        })
}

fn cmd_solve(args: &[String]) {
    let mut params = RunParameters::default();
    let mut out_dir = PathBuf::from("out");
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                params.scenario = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--scenario requires a name");
                    process::exit(1);
                });
            }
            "--chao-wells-mult" => {
                i += 1;
                let value = parse_f64(args, i, "--chao-wells-mult");
                params
                    .supply_multipliers
                    .insert(SourceId::new("CHAO-WELLS"), value);
            }
            "--viru-wells-mult" => {
                i += 1;
                let value = parse_f64(args, i, "--viru-wells-mult");
                params
                    .supply_multipliers
                    .insert(SourceId::new("VIRU-WELLS"), value);
            }
            "--penalty" => {
                i += 1;
                params.penalty_usd_per_hm3 = parse_f64(args, i, "--penalty");
            }
            "--weight-potable" => {
                i += 1;
                params.weights.potable_treatment = parse_f64(args, i, "--weight-potable");
            }
            "--weight-industrial" => {
                i += 1;
                params.weights.industrial_livestock = parse_f64(args, i, "--weight-industrial");
            }
            "--weight-agriculture" => {
                i += 1;
                params.weights.agriculture = parse_f64(args, i, "--weight-agriculture");
            }
            "--canal-cap" => {
                i += 1;
                params.canal_capacity_m3s = parse_f64(args, i, "--canal-cap");
            }
            "--solver" => {
                i += 1;
                let name = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--solver requires 'cbc' or 'simplex'");
                    process::exit(1);
                });
                params.solver.choice = name.parse::<SolverChoice>().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                });
            }
            "--time-limit" => {
                i += 1;
                params.solver.time_limit_secs = Some(parse_f64(args, i, "--time-limit"));
            }
            "--solver-verbose" => {
                params.solver.verbose = true;
            }
            "--out" => {
                i += 1;
                out_dir = PathBuf::from(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--out requires a directory path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let basin = Basin::chao_viru();
    let outcome = AllocationEngine::run(&basin, &params).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    match format.as_str() {
        "json" => match serde_json::to_string_pretty(&outcome.summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        },
        "text" => print!("{}", outcome.summary),
        other => {
            eprintln!("Unknown format: {} (expected 'text' or 'json')", other);
            process::exit(1);
        }
    }

    let paths = report::write_artifacts(&out_dir, &outcome).unwrap_or_else(|e| {
        eprintln!("Error writing artifacts: {}", e);
        process::exit(1);
    });
    eprintln!("Artifacts written:");
    eprintln!("  {}", paths.allocations.display());
    eprintln!("  {}", paths.deficits.display());
    eprintln!("  {}", paths.summary.display());
}

fn cmd_scenarios() {
    let basin = Basin::chao_viru();
    println!("Available scenarios:");
    for name in basin.scenario_names() {
        let scenario = match basin.scenario(name) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };
        let effs: Vec<String> = basin
            .demands()
            .iter()
            .map(|d| format!("{}={}", d.id(), scenario.efficiency(d.id())))
            .collect();
        println!("  {}: {}", name, effs.join(", "));
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "solve" => cmd_solve(rest),
        "scenarios" => cmd_scenarios(),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
