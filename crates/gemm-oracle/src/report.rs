use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CaseOutcome, ExecutionTarget, OracleError, Seed};

/// Serialized outcome of a case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    Passed { target: ExecutionTarget },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: CaseStatus,
}

/// Outcomes of a suite run, together with the seed that produced its operands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    seed: Seed,
    records: Vec<CaseRecord>,
}

impl SuiteReport {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            records: Vec::new(),
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn push(&mut self, name: String, outcome: &CaseOutcome) {
        let status = match outcome {
            CaseOutcome::Passed { target } => CaseStatus::Passed { target: *target },
            CaseOutcome::Skipped { reason } => CaseStatus::Skipped {
                reason: reason.clone(),
            },
            CaseOutcome::Failed(failure) => CaseStatus::Failed {
                error: failure.error.to_string(),
            },
        };

        self.records.push(CaseRecord { name, status });
    }

    /// Appends the records of another run.
    pub fn extend(&mut self, other: SuiteReport) {
        self.records.extend(other.records);
    }

    pub fn passed(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record.status, CaseStatus::Passed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record.status, CaseStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record.status, CaseStatus::Failed { .. }))
    }

    /// Passed cases that ran on the host instead of the accelerator.
    pub fn fallbacks(&self) -> impl Iterator<Item = &CaseRecord> {
        self.records.iter().filter(|record| {
            record.status
                == CaseStatus::Passed {
                    target: ExecutionTarget::Host,
                }
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "seed {}: {} passed ({} on host), {} skipped, {} failed",
            self.seed.value(),
            self.passed().count(),
            self.fallbacks().count(),
            self.skipped().count(),
            self.failed().count(),
        )
    }

    /// Fails with the names of the failed cases, if any.
    pub fn into_result(self) -> Result<Self, OracleError> {
        let names: Vec<String> = self.failed().map(|record| record.name.clone()).collect();

        if names.is_empty() {
            Ok(self)
        } else {
            Err(OracleError::SuiteFailed {
                names,
                total: self.records.len(),
            })
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OracleError> {
        let path = path.as_ref();
        let report_err = |reason: String| OracleError::Report {
            path: path.to_path_buf(),
            reason,
        };

        let content = serde_json::to_string_pretty(self).map_err(|err| report_err(err.to_string()))?;
        std::fs::write(path, content).map_err(|err| report_err(err.to_string()))
    }
}
