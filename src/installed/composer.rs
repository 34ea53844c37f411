use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{Result, VerifyError};

use super::{Dependency, DependencySource};

/// Composer's default when `preferred-install` is not configured.
const DEFAULT_PREFERRED_INSTALL: &str = "dist";

/// Reads Composer's record of installed packages.
///
/// Packages come from `<vendor>/composer/installed.json`, the installation
/// mode from `config.preferred-install` in the root `composer.json`.
#[derive(Debug, Clone)]
pub struct ComposerSource {
    vendor_dir: PathBuf,
}

impl ComposerSource {
    pub fn new(vendor_dir: impl Into<PathBuf>) -> Self {
        Self {
            vendor_dir: vendor_dir.into(),
        }
    }
}

impl Default for ComposerSource {
    fn default() -> Self {
        Self::new("vendor")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InstalledFile {
    /// Composer 1: a bare array.
    Bare(Vec<InstalledPackage>),
    /// Composer 2: `{ "packages": [...], "dev": true, ... }`.
    Wrapped { packages: Vec<InstalledPackage> },
}

#[derive(Deserialize)]
struct InstalledPackage {
    name: String,
    /// `None` when absent, `Some(None)` for an explicit `null`.
    #[serde(rename = "install-path", default, deserialize_with = "present")]
    install_path: Option<Option<String>>,
    #[serde(rename = "installation-source", default)]
    installation_source: Option<String>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl DependencySource for ComposerSource {
    fn load(&self, root: &Path) -> Result<Vec<Dependency>> {
        let vendor = root.join(&self.vendor_dir);
        let composer_dir = vendor.join("composer");
        let installed_json = composer_dir.join("installed.json");

        if !installed_json.exists() {
            return Err(VerifyError::Config(format!(
                "no installed packages found at {} (run `composer install` first)",
                installed_json.display()
            )));
        }

        let content = std::fs::read_to_string(&installed_json)?;
        let packages = match serde_json::from_str::<InstalledFile>(&content)? {
            InstalledFile::Bare(packages) | InstalledFile::Wrapped { packages } => packages,
        };

        let mut deps = Vec::with_capacity(packages.len());
        for pkg in packages {
            let install_path = match pkg.install_path {
                Some(Some(rel)) => composer_dir.join(rel),
                Some(None) => {
                    tracing::debug!(package = %pkg.name, "no install path (metapackage), skipping");
                    continue;
                }
                None => vendor.join(&pkg.name),
            };
            deps.push(Dependency {
                name: pkg.name,
                install_path,
                installation_source: pkg.installation_source,
            });
        }

        tracing::debug!(count = deps.len(), path = %installed_json.display(), "loaded installed packages");
        Ok(deps)
    }

    fn install_mode(&self, root: &Path) -> Result<String> {
        let manifest = root.join("composer.json");
        if !manifest.exists() {
            return Ok(DEFAULT_PREFERRED_INSTALL.into());
        }

        let content = std::fs::read_to_string(&manifest)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;

        Ok(match value.pointer("/config/preferred-install") {
            Some(serde_json::Value::String(mode)) => mode.clone(),
            // Per-package maps and other shapes are reported verbatim.
            Some(other) => other.to_string(),
            None => DEFAULT_PREFERRED_INSTALL.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_composer2_layout_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "vendor/composer/installed.json",
            r#"{
                "packages": [
                    {"name": "zeta/last", "install-path": "../zeta/last", "installation-source": "source"},
                    {"name": "acme/meta", "type": "metapackage", "install-path": null},
                    {"name": "acme/log", "install-path": "../acme/log", "installation-source": "dist"}
                ],
                "dev": true
            }"#,
        );

        let deps = ComposerSource::default().load(dir.path()).unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta/last", "acme/log"]);
        assert_eq!(
            deps[0].install_path,
            dir.path().join("vendor/composer/../zeta/last")
        );
        assert_eq!(deps[0].installation_source.as_deref(), Some("source"));
        assert_eq!(deps[1].installation_source.as_deref(), Some("dist"));
    }

    #[test]
    fn loads_composer1_layout_with_default_paths() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "lib/composer/installed.json",
            r#"[{"name": "acme/log", "version": "1.0.0"}]"#,
        );

        let deps = ComposerSource::new("lib").load(dir.path()).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].install_path, dir.path().join("lib").join("acme/log"));
    }

    #[test]
    fn missing_installed_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ComposerSource::default().load(dir.path()).unwrap_err();
        assert!(matches!(err, VerifyError::Config(_)));
        assert!(err.to_string().contains("installed.json"));
    }

    #[test]
    fn install_mode_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "composer.json",
            r#"{"require": {}, "config": {"preferred-install": "source"}}"#,
        );
        assert_eq!(ComposerSource::default().install_mode(dir.path()).unwrap(), "source");
    }

    #[test]
    fn install_mode_defaults_to_dist() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ComposerSource::default().install_mode(dir.path()).unwrap(), "dist");

        write(dir.path(), "composer.json", r#"{"require": {}}"#);
        assert_eq!(ComposerSource::default().install_mode(dir.path()).unwrap(), "dist");
    }

    #[test]
    fn install_mode_map_is_reported_as_json() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "composer.json",
            r#"{"config": {"preferred-install": {"acme/*": "source"}}}"#,
        );
        let mode = ComposerSource::default().install_mode(dir.path()).unwrap();
        assert_eq!(mode, r#"{"acme/*":"source"}"#);
    }
}
