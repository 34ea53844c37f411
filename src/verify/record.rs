use serde::{Deserialize, Serialize};

use super::check::SignatureCheck;
use super::policy::SignaturePolicy;

/// Verification verdict for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DependencyRecord {
    /// Signature checks were run: the `HEAD` commit first, then one per
    /// tag pointing at `HEAD`, in the order git reported them.
    Checked {
        identifier: String,
        checks: Vec<SignatureCheck>,
    },
    /// The installed copy has no version-control metadata to check.
    Unverifiable {
        identifier: String,
        /// How the package manager reports it installed the package.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        installed_as: Option<String>,
    },
}

impl DependencyRecord {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Checked { identifier, .. } | Self::Unverifiable { identifier, .. } => identifier,
        }
    }

    /// True when at least one signature check passed.
    pub fn is_verified(&self) -> bool {
        self.is_verified_under(SignaturePolicy::Any)
    }

    pub fn is_verified_under(&self, policy: SignaturePolicy) -> bool {
        match self {
            Self::Checked { checks, .. } => match policy {
                SignaturePolicy::Any => checks.iter().any(SignatureCheck::passed),
                SignaturePolicy::All => {
                    !checks.is_empty() && checks.iter().all(SignatureCheck::passed)
                }
            },
            Self::Unverifiable { .. } => false,
        }
    }

    pub fn checks(&self) -> &[SignatureCheck] {
        match self {
            Self::Checked { checks, .. } => checks,
            Self::Unverifiable { .. } => &[],
        }
    }

    /// Human-readable reason this dependency is not verified.
    ///
    /// For checked dependencies every failed check is listed with its
    /// command and raw output.
    pub fn explain(&self) -> String {
        match self {
            Self::Checked { checks, .. } => {
                let failed: Vec<String> = checks
                    .iter()
                    .filter(|c| !c.passed())
                    .map(|c| {
                        let output = c.output.trim_end();
                        let output = if output.is_empty() {
                            "(no output)"
                        } else {
                            output
                        };
                        format!(
                            "{} not verified: `{}` exited with status {}\n{}",
                            c.kind, c.command, c.status, output
                        )
                    })
                    .collect();
                if failed.is_empty() {
                    "all signature checks passed".into()
                } else {
                    failed.join("\n")
                }
            }
            Self::Unverifiable { installed_as, .. } => {
                let mut text = String::from(
                    "The installed package has no recognizable version-control metadata \
                     (no .git directory), so its signatures cannot be checked.",
                );
                if let Some(source) = installed_as.as_deref().filter(|s| *s != "source") {
                    text.push_str(&format!(
                        " The package manager installed it from \"{}\".",
                        source
                    ));
                }
                text.push_str(
                    " Install it from source (e.g. `composer install --prefer-source`, or set \
                     `preferred-install` to \"source\") and remove the existing copy so it is \
                     re-installed as a git checkout.",
                );
                text
            }
        }
    }
}
