use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::VerificationRun;
use crate::verify::{DependencyRecord, SignaturePolicy};

#[derive(Serialize)]
struct JsonReport<'a> {
    checked_at: DateTime<Utc>,
    passed: bool,
    policy: SignaturePolicy,
    verified: usize,
    failed: usize,
    dependencies: Vec<JsonDependency<'a>>,
}

#[derive(Serialize)]
struct JsonDependency<'a> {
    verified: bool,
    #[serde(flatten)]
    record: &'a DependencyRecord,
}

/// Render a verification run as a JSON report.
pub fn render(run: &VerificationRun) -> Result<String> {
    let report = JsonReport {
        checked_at: Utc::now(),
        passed: run.passed(),
        policy: run.policy,
        verified: run.verified().count(),
        failed: run.failed().count(),
        dependencies: run
            .records
            .iter()
            .map(|record| JsonDependency {
                verified: run.policy.accepts(record),
                record,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}
