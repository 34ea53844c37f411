use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

use super::record::DependencyRecord;

/// How the signature checks of one dependency combine into a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignaturePolicy {
    /// A signed commit or any signed tag is enough.
    #[default]
    Any,
    /// The commit and every tag pointing at it must be signed.
    All,
}

impl SignaturePolicy {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "any" | "or" => Some(Self::Any),
            "all" | "and" => Some(Self::All),
            _ => None,
        }
    }

    /// Strict parse for user input: an unknown name is an error rather
    /// than a silent fallback to a weaker policy.
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        Self::from_str_lenient(s).ok_or_else(|| {
            VerifyError::Config(format!(
                "unknown signature policy '{}' (expected 'any' or 'all')",
                s
            ))
        })
    }

    pub fn accepts(&self, record: &DependencyRecord) -> bool {
        record.is_verified_under(*self)
    }
}

impl std::fmt::Display for SignaturePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
        }
    }
}
