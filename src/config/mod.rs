use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::LocaleSetting;
use crate::verify::SignaturePolicy;

/// Top-level configuration from `.depsig.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub locale: LocaleSetting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Overrides the installation mode read from the package manifest.
    #[serde(default)]
    pub mode: Option<String>,
    /// Vendor directory, relative to the project root.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: PathBuf,
}

fn default_vendor_dir() -> PathBuf {
    PathBuf::from("vendor")
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            mode: None,
            vendor_dir: default_vendor_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// `any`: a signed commit or one signed tag suffices. `all`: every check must pass.
    #[serde(default)]
    pub require: SignaturePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git_binary")]
    pub binary: String,
}

fn default_git_binary() -> String {
    "git".into()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# depsig configuration

[install]
# Vendor directory holding installed packages.
vendor_dir = "vendor"

# Override the installation mode from composer.json. Only "source" can be verified.
# mode = "source"

[policy]
# "any": a signed HEAD commit or any signed tag pointing at it is enough.
# "all": the commit and every tag pointing at it must be signed.
require = "any"

[git]
binary = "git"

[locale]
# Pinned while git runs so its output is stable.
var = "LC_ALL"
value = "C"
"#
    }
}
