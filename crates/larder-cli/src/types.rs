use larder_model::{DataQualityIssue, LoadReport};

/// Outcome of one pipeline run, assembled for the summary and exit code.
#[derive(Debug)]
pub struct RunResult {
    /// Target database description (path or ":memory:").
    pub database: String,
    pub dry_run: bool,
    /// Derived row counts per relation, in load order.
    pub derived: Vec<(String, usize)>,
    /// Load report; absent on a dry run.
    pub report: Option<LoadReport>,
    pub issues: Vec<DataQualityIssue>,
    pub errors: Vec<String>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self
                .report
                .as_ref()
                .is_some_and(|report| report.has_failures())
    }
}
