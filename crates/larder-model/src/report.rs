//! Load outcome reporting.
//!
//! The loader isolates failures per relation: one failed write is recorded
//! here and the remaining relations still load. The report is what the CLI
//! renders and what decides the process exit code.

use serde::Serialize;

/// A relation that loaded successfully, with the affected-row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
}

/// A relation whose write failed and was rolled back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailure {
    pub table: String,
    pub error: String,
}

/// A foreign key violation found after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FkViolation {
    pub table: String,
    pub referenced_table: String,
    pub rows: usize,
}

/// Final status of one load phase.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<TableLoad>,
    pub failed: Vec<LoadFailure>,
    pub fk_violations: Vec<FkViolation>,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Row count for a loaded relation, if it loaded.
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.loaded
            .iter()
            .find(|load| load.table == table)
            .map(|load| load.rows)
    }

    pub fn record_success(&mut self, table: impl Into<String>, rows: usize) {
        self.loaded.push(TableLoad {
            table: table.into(),
            rows,
        });
    }

    pub fn record_failure(&mut self, table: impl Into<String>, error: impl Into<String>) {
        self.failed.push(LoadFailure {
            table: table.into(),
            error: error.into(),
        });
    }
}
