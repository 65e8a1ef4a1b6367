//! Persistence of run artifacts: two CSV tables and a JSON summary.
//!
//! Writers receive already-rounded records from the extraction
//! boundary; nothing here reinterprets numbers.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::optimization::results::{AllocationOutcome, AllocationRecord, DeficitRecord, RunSummary};

/// Errors from writing run artifacts to disk.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Paths of the files one run produced.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub allocations: PathBuf,
    pub deficits: PathBuf,
    pub summary: PathBuf,
}

/// Write `allocations.csv`, `deficits.csv`, and `summary.json` into a
/// directory, creating it if needed.
pub fn write_artifacts(dir: &Path, outcome: &AllocationOutcome) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(dir)?;

    let paths = ReportPaths {
        allocations: dir.join("allocations.csv"),
        deficits: dir.join("deficits.csv"),
        summary: dir.join("summary.json"),
    };

    write_allocations_csv(&paths.allocations, &outcome.allocations)?;
    write_deficits_csv(&paths.deficits, &outcome.deficits)?;
    write_summary_json(&paths.summary, &outcome.summary)?;

    Ok(paths)
}

/// Write the per-arc allocation table.
pub fn write_allocations_csv(path: &Path, records: &[AllocationRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the per-(demand, month) deficit table.
pub fn write_deficits_csv(path: &Path, records: &[DeficitRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the summary object as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::basin::Basin;
    use crate::optimization::engine::{AllocationEngine, RunParameters};

    #[test]
    fn test_artifacts_written_and_parseable() {
        let basin = Basin::chao_viru();
        let outcome = AllocationEngine::run(&basin, &RunParameters::default()).unwrap();

        let dir = std::env::temp_dir().join("basin-allocator-report-test");
        let paths = write_artifacts(&dir, &outcome).unwrap();

        let alloc_csv = fs::read_to_string(&paths.allocations).unwrap();
        assert!(alloc_csv.starts_with("month,source,demand,"));
        // Header plus one row per valid arc.
        assert_eq!(alloc_csv.lines().count(), 1 + outcome.allocations.len());

        let deficit_csv = fs::read_to_string(&paths.deficits).unwrap();
        assert_eq!(deficit_csv.lines().count(), 1 + outcome.deficits.len());

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.summary).unwrap()).unwrap();
        assert_eq!(summary["scenario"], "S1");
        assert!(summary["objective_usd"].is_number());

        fs::remove_dir_all(&dir).ok();
    }
}
