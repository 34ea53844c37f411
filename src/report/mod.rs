//! Runs verification over every installed dependency and turns the
//! records into a single pass/fail outcome.

pub mod env;

use serde::Serialize;

use crate::error::{Result, VerifyError};
use crate::installed::Dependency;
use crate::verify::{DependencyRecord, Engine, SignaturePolicy};

pub use env::{LocalePin, LocaleSetting};

/// The only installation mode that leaves repositories on disk.
pub const SOURCE_INSTALL_MODE: &str = "source";

/// All records of one run, in dependency order.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRun {
    pub policy: SignaturePolicy,
    pub records: Vec<DependencyRecord>,
}

impl VerificationRun {
    pub fn verified(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.iter().filter(|r| self.policy.accepts(r))
    }

    pub fn failed(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.iter().filter(|r| !self.policy.accepts(r))
    }

    pub fn passed(&self) -> bool {
        self.failed().next().is_none()
    }

    /// One block per failed dependency (identifier, then explanation),
    /// separated by blank lines. `None` when everything verified.
    pub fn failure_report(&self) -> Option<String> {
        let blocks: Vec<String> = self
            .failed()
            .map(|r| format!("{}\n{}", r.identifier(), r.explain()))
            .collect();
        if blocks.is_empty() {
            None
        } else {
            Some(blocks.join("\n\n"))
        }
    }
}

/// Fail unless dependencies were installed as version-control checkouts.
pub fn require_source_install(install_mode: &str) -> Result<()> {
    if install_mode == SOURCE_INSTALL_MODE {
        Ok(())
    } else {
        Err(VerifyError::InstallMode {
            actual: install_mode.to_string(),
        })
    }
}

/// Verify every dependency, in order.
///
/// The installation mode is checked before anything else. Signature
/// failures are collected; a command that cannot run aborts the run. The
/// locale pin is held for the whole loop and released on every exit path.
pub fn run(
    deps: &[Dependency],
    install_mode: &str,
    engine: &Engine<'_>,
    policy: SignaturePolicy,
    locale: &LocaleSetting,
) -> Result<VerificationRun> {
    require_source_install(install_mode)?;

    let _pin = LocalePin::acquire(locale);

    let mut records = Vec::with_capacity(deps.len());
    for dep in deps {
        let record = engine.verify(dep)?;
        if policy.accepts(&record) {
            tracing::info!(dependency = %dep.name, "signature verified");
        } else {
            tracing::warn!(dependency = %dep.name, "signature verification failed");
        }
        records.push(record);
    }

    Ok(VerificationRun { policy, records })
}

/// Turn a finished run into `Ok(())` or one consolidated error.
pub fn enforce(run: &VerificationRun) -> Result<()> {
    match run.failure_report() {
        None => Ok(()),
        Some(report) => Err(VerifyError::Unverified {
            count: run.failed().count(),
            report,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::verify::runner::testing::ScriptedRunner;
    use crate::verify::Git;

    fn repo(root: &Path, name: &str) -> Dependency {
        let path = root.join(name);
        std::fs::create_dir_all(path.join(".git")).unwrap();
        Dependency::new(name, path)
    }

    fn plain(root: &Path, name: &str) -> Dependency {
        let path = root.join(name);
        std::fs::create_dir_all(&path).unwrap();
        Dependency::new(name, path)
    }

    fn locale(var: &str) -> LocaleSetting {
        LocaleSetting {
            var: var.into(),
            value: "C".into(),
        }
    }

    #[test]
    fn wrong_install_mode_fails_before_any_command() {
        let dir = tempfile::tempdir().unwrap();
        let deps = vec![repo(dir.path(), "pkg/a")];
        let runner = ScriptedRunner::new();
        let engine = Engine::new(Box::new(Git::default()), &runner);

        let err = run(&deps, "dist", &engine, SignaturePolicy::Any, &locale("DEPSIG_TEST_MODE")).unwrap_err();
        assert!(matches!(err, VerifyError::InstallMode { ref actual } if actual == "dist"));
        assert!(err.to_string().contains("'dist'"));
        assert_eq!(runner.call_count(), 0);
        assert!(std::env::var_os("DEPSIG_TEST_MODE").is_none());
    }

    #[test]
    fn one_failure_among_many_is_reported_alone() {
        let dir = tempfile::tempdir().unwrap();
        let deps = vec![
            repo(dir.path(), "pkg/a"),
            repo(dir.path(), "pkg/c"),
            repo(dir.path(), "pkg/z"),
        ];
        let a = dir.path().join("pkg/a").display().to_string();
        let c = dir.path().join("pkg/c").display().to_string();
        let z = dir.path().join("pkg/z").display().to_string();
        let runner = ScriptedRunner::new()
            .on(&format!("{} verify-commit -v HEAD", a), 0, "gpg: Good signature")
            .on(&format!("{} verify-commit -v HEAD", c), 1, "error: no signature found")
            .on(&format!("{} verify-commit -v HEAD", z), 0, "gpg: Good signature")
            .on("tag --points-at HEAD", 0, "");
        let engine = Engine::new(Box::new(Git::default()), &runner);

        let outcome = run(&deps, "source", &engine, SignaturePolicy::Any, &locale("DEPSIG_TEST_ONE")).unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.verified().count(), 2);
        assert!(!outcome.passed());

        let err = enforce(&outcome).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        match err {
            VerifyError::Unverified { count, report } => {
                assert_eq!(count, 1);
                let expected = format!(
                    "pkg/c\nHEAD commit not verified: `git --git-dir={}/.git --work-tree={} verify-commit -v HEAD` exited with status 1\nerror: no signature found",
                    c, c
                );
                assert_eq!(report, expected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_dependency_is_checked_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let deps = vec![
            plain(dir.path(), "pkg/d"),
            repo(dir.path(), "pkg/c"),
            repo(dir.path(), "pkg/b"),
        ];
        let runner = ScriptedRunner::new()
            .on("verify-commit -v HEAD", 1, "error: no signature found")
            .on("pkg/c tag --points-at HEAD", 0, "")
            .on("pkg/b tag --points-at HEAD", 0, "v1.0.0\n")
            .on("verify-tag v1.0.0", 0, "gpg: Good signature");
        let engine = Engine::new(Box::new(Git::default()), &runner);

        let outcome = run(&deps, "source", &engine, SignaturePolicy::Any, &locale("DEPSIG_TEST_ALL")).unwrap();
        let failed: Vec<&str> = outcome.failed().map(|r| r.identifier()).collect();
        assert_eq!(failed, vec!["pkg/d", "pkg/c"]);
        assert_eq!(outcome.verified().map(|r| r.identifier()).collect::<Vec<_>>(), vec!["pkg/b"]);

        let report = outcome.failure_report().unwrap();
        let blocks: Vec<&str> = report.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("pkg/d\n"));
        assert!(blocks[1].starts_with("pkg/c\n"));
        assert!(!report.contains("pkg/b"));
    }

    #[test]
    fn all_policy_rejects_unsigned_tag() {
        let dir = tempfile::tempdir().unwrap();
        let deps = vec![repo(dir.path(), "pkg/t")];
        let runner = ScriptedRunner::new()
            .on("verify-commit -v HEAD", 0, "")
            .on("tag --points-at HEAD", 0, "nightly\n")
            .on("verify-tag nightly", 1, "error: no signature found");
        let engine = Engine::new(Box::new(Git::default()), &runner);

        let strict = run(&deps, "source", &engine, SignaturePolicy::All, &locale("DEPSIG_TEST_STRICT")).unwrap();
        assert!(!strict.passed());
        assert!(strict.failure_report().unwrap().contains("tag 'nightly' not verified"));

        let lenient = run(&deps, "source", &engine, SignaturePolicy::Any, &locale("DEPSIG_TEST_STRICT")).unwrap();
        assert!(lenient.passed());
        assert!(enforce(&lenient).is_ok());
    }

    #[test]
    fn empty_dependency_set_passes() {
        let runner = ScriptedRunner::new();
        let engine = Engine::new(Box::new(Git::default()), &runner);
        let outcome = run(&[], "source", &engine, SignaturePolicy::Any, &locale("DEPSIG_TEST_EMPTY")).unwrap();
        assert!(outcome.passed());
        assert!(outcome.failure_report().is_none());
    }

    #[test]
    fn locale_is_restored_on_every_exit_path() {
        let var = "DEPSIG_TEST_RESTORE";
        std::env::set_var(var, "de_DE.UTF-8");
        let dir = tempfile::tempdir().unwrap();

        // success
        let deps = vec![repo(dir.path(), "pkg/a")];
        let ok_runner = ScriptedRunner::new();
        let engine = Engine::new(Box::new(Git::default()), &ok_runner);
        assert!(run(&deps, "source", &engine, SignaturePolicy::Any, &locale(var)).unwrap().passed());
        assert_eq!(std::env::var(var).unwrap(), "de_DE.UTF-8");

        // verification failures
        let bad_runner = ScriptedRunner::new().on("verify-commit -v HEAD", 1, "error: no signature found");
        let engine = Engine::new(Box::new(Git::default()), &bad_runner);
        assert!(!run(&deps, "source", &engine, SignaturePolicy::Any, &locale(var)).unwrap().passed());
        assert_eq!(std::env::var(var).unwrap(), "de_DE.UTF-8");

        // fatal fault
        let broken_runner = ScriptedRunner::new().unspawnable("verify-commit -v HEAD");
        let engine = Engine::new(Box::new(Git::default()), &broken_runner);
        let err = run(&deps, "source", &engine, SignaturePolicy::Any, &locale(var)).unwrap_err();
        assert!(matches!(err, VerifyError::CommandSpawn { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(std::env::var(var).unwrap(), "de_DE.UTF-8");

        std::env::remove_var(var);
    }
}
