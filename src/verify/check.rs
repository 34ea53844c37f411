use serde::{Deserialize, Serialize};

use super::runner::{CommandOutput, Invocation};

/// What a signature check looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "name")]
pub enum CheckKind {
    /// The checked-out `HEAD` commit.
    Commit,
    /// A tag pointing at `HEAD`.
    Tag(String),
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Commit => write!(f, "HEAD commit"),
            Self::Tag(name) => write!(f, "tag '{}'", name),
        }
    }
}

/// Outcome of one signature verification command.
///
/// Only the exit status decides the verdict; the output is kept for
/// diagnostics and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureCheck {
    /// Identifier of the dependency this check belongs to.
    pub dependency: String,
    pub kind: CheckKind,
    /// Command text exactly as executed.
    pub command: String,
    pub status: i32,
    /// Combined stdout and stderr.
    pub output: String,
}

impl SignatureCheck {
    /// Record the result of verifying the checked-out commit.
    pub fn commit(dependency: &str, invocation: &Invocation, result: CommandOutput) -> Self {
        Self::new(dependency, CheckKind::Commit, invocation, result)
    }

    /// Record the result of verifying one tag.
    pub fn tag(dependency: &str, tag: &str, invocation: &Invocation, result: CommandOutput) -> Self {
        Self::new(dependency, CheckKind::Tag(tag.to_string()), invocation, result)
    }

    fn new(dependency: &str, kind: CheckKind, invocation: &Invocation, result: CommandOutput) -> Self {
        Self {
            dependency: dependency.to_string(),
            kind,
            command: invocation.to_string(),
            status: result.status,
            output: result.output,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == 0
    }
}
