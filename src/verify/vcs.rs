use std::path::Path;

use super::runner::Invocation;

/// Command syntax of a version-control tool that can verify signatures.
///
/// The engine only depends on these operations, so another tool can be
/// plugged in without touching the check protocol.
pub trait Vcs {
    /// Tool name for logs.
    fn name(&self) -> &'static str;

    /// Whether `path` holds a repository this tool understands.
    fn detect(&self, path: &Path) -> bool;

    /// Verify the signature of the checked-out revision, verbosely.
    fn commit_check(&self, path: &Path) -> Invocation;

    /// List tags pointing at the checked-out revision.
    fn tags_at_head(&self, path: &Path) -> Invocation;

    /// Verify the signature of one tag.
    fn tag_check(&self, path: &Path, tag: &str) -> Invocation;

    /// Turn the output of [`Vcs::tags_at_head`] into tag names, in order.
    fn parse_tags(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Git, driven through its porcelain commands.
#[derive(Debug, Clone)]
pub struct Git {
    binary: String,
}

impl Git {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Both the repository and the work tree are given explicitly, so git
    /// never falls back to a repository in a parent directory.
    fn invocation(&self, path: &Path, rest: &[&str]) -> Invocation {
        let mut args = vec![
            format!("--git-dir={}", path.join(".git").display()),
            format!("--work-tree={}", path.display()),
        ];
        args.extend(rest.iter().map(|s| s.to_string()));
        Invocation::new(self.binary.clone(), args)
    }
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Vcs for Git {
    fn name(&self) -> &'static str {
        "git"
    }

    fn detect(&self, path: &Path) -> bool {
        // A worktree or submodule has a `.git` file instead of a directory.
        path.join(".git").exists()
    }

    fn commit_check(&self, path: &Path) -> Invocation {
        self.invocation(path, &["verify-commit", "-v", "HEAD"])
    }

    fn tags_at_head(&self, path: &Path) -> Invocation {
        self.invocation(path, &["tag", "--points-at", "HEAD"])
    }

    fn tag_check(&self, path: &Path, tag: &str) -> Invocation {
        self.invocation(path, &["verify-tag", tag])
    }
}
