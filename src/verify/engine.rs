use crate::error::Result;
use crate::installed::Dependency;

use super::check::SignatureCheck;
use super::record::DependencyRecord;
use super::runner::CommandRunner;
use super::vcs::Vcs;

/// Runs the signature check protocol against installed dependencies.
pub struct Engine<'r> {
    vcs: Box<dyn Vcs>,
    runner: &'r dyn CommandRunner,
}

impl<'r> Engine<'r> {
    pub fn new(vcs: Box<dyn Vcs>, runner: &'r dyn CommandRunner) -> Self {
        Self { vcs, runner }
    }

    /// Produce the verification record for one dependency.
    ///
    /// Failing signatures end up in the record. `Err` means a command could
    /// not be run at all.
    pub fn verify(&self, dep: &Dependency) -> Result<DependencyRecord> {
        let path = dep.install_path.as_path();

        if !self.vcs.detect(path) {
            tracing::debug!(
                dependency = %dep.name,
                path = %path.display(),
                vcs = self.vcs.name(),
                installed_as = dep.installation_source.as_deref().unwrap_or("unknown"),
                "no repository metadata, dependency is unverifiable"
            );
            return Ok(DependencyRecord::Unverifiable {
                identifier: dep.name.clone(),
                installed_as: dep.installation_source.clone(),
            });
        }

        let mut checks = Vec::new();

        let commit = self.vcs.commit_check(path);
        let result = self.runner.run(&commit)?;
        tracing::debug!(dependency = %dep.name, command = %commit, status = result.status, "commit check");
        checks.push(SignatureCheck::commit(&dep.name, &commit, result));

        let listing = self.vcs.tags_at_head(path);
        let tags = self.runner.run(&listing)?;
        // A repository git cannot read has no tags to offer; the failed
        // commit check already carries git's complaint.
        let tag_names = if tags.success() {
            self.vcs.parse_tags(&tags.output)
        } else {
            tracing::warn!(
                dependency = %dep.name,
                command = %listing,
                status = tags.status,
                output = %tags.output.trim_end(),
                "listing tags failed, checking the commit only"
            );
            Vec::new()
        };

        for tag in tag_names {
            let inv = self.vcs.tag_check(path, &tag);
            let result = self.runner.run(&inv)?;
            tracing::debug!(dependency = %dep.name, command = %inv, status = result.status, "tag check");
            checks.push(SignatureCheck::tag(&dep.name, &tag, &inv, result));
        }

        Ok(DependencyRecord::Checked {
            identifier: dep.name.clone(),
            checks,
        })
    }
}
