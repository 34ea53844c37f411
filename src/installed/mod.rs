pub mod composer;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use composer::ComposerSource;

/// An installed dependency and where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Stable package identifier, e.g. `acme/log`.
    pub name: String,
    pub install_path: PathBuf,
    /// How the package manager says it installed the package ("source", "dist").
    pub installation_source: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            install_path: install_path.into(),
            installation_source: None,
        }
    }
}

/// A package manager's view of a project: what is installed, and how.
pub trait DependencySource {
    /// Installed dependencies, in the package manager's order.
    fn load(&self, root: &Path) -> Result<Vec<Dependency>>;

    /// The configured installation mode. Only `"source"` yields checkouts.
    fn install_mode(&self, root: &Path) -> Result<String>;
}
