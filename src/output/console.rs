use crate::report::VerificationRun;
use crate::verify::{CheckKind, DependencyRecord};

/// Render a run as plain console output: one line per dependency, then
/// the explanation of every failure.
pub fn render(run: &VerificationRun) -> String {
    let mut output = String::new();

    if run.records.is_empty() {
        output.push_str("\n  No installed dependencies to verify.\n\n");
        return output;
    }

    output.push_str(&format!(
        "\n  {} dependency(ies) checked:\n\n",
        run.records.len()
    ));

    for record in &run.records {
        let accepted = run.policy.accepts(record);
        let tag = if accepted { "[ok]  " } else { "[FAIL]" };
        output.push_str(&format!(
            "  {} {} ({})\n",
            tag,
            record.identifier(),
            summary(record, accepted)
        ));
    }

    if let Some(report) = run.failure_report() {
        output.push_str("\n  Failures:\n\n");
        for line in report.lines() {
            if line.is_empty() {
                output.push('\n');
            } else {
                output.push_str(&format!("    {}\n", line));
            }
        }
    }

    let status = if run.passed() { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "\n  Result: {} ({} verified, {} failed, policy: {})\n\n",
        status,
        run.verified().count(),
        run.failed().count(),
        run.policy,
    ));

    output
}

fn summary(record: &DependencyRecord, accepted: bool) -> String {
    match record {
        DependencyRecord::Unverifiable { .. } => "no version-control metadata".into(),
        DependencyRecord::Checked { checks, .. } if accepted => {
            let via: Vec<String> = checks
                .iter()
                .filter(|c| c.passed())
                .map(|c| match &c.kind {
                    CheckKind::Commit => "signed commit".to_string(),
                    CheckKind::Tag(name) => format!("signed tag {}", name),
                })
                .collect();
            via.join(", ")
        }
        DependencyRecord::Checked { checks, .. } => {
            let failed = checks.iter().filter(|c| !c.passed()).count();
            format!("{} of {} signature check(s) failed", failed, checks.len())
        }
    }
}
