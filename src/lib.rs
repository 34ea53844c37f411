//! depsig — signature provenance checks for source-installed dependencies.
//!
//! Every dependency installed from version control must have either a
//! signed `HEAD` commit or a signed tag pointing at `HEAD`. Dependencies
//! that fail are collected into one report.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use depsig::{verify, VerifyOptions};
//!
//! let options = VerifyOptions::default();
//! let run = verify(Path::new("./my-project"), &options).unwrap();
//! println!("Pass: {}, Failed: {}", run.passed(), run.failed().count());
//! ```

pub mod config;
pub mod error;
pub mod installed;
pub mod output;
pub mod report;
pub mod verify;

use std::path::{Path, PathBuf};

use config::Config;
use error::Result;
use installed::{ComposerSource, DependencySource};
use output::OutputFormat;
use report::VerificationRun;
use verify::{CommandRunner, Engine, Git, SignaturePolicy, SystemRunner};

/// Options for a verification invocation.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Path to config file (defaults to `.depsig.toml` in the project root).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for the installation mode.
    pub install_mode_override: Option<String>,
    /// CLI override for the signature policy.
    pub policy_override: Option<SignaturePolicy>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            install_mode_override: None,
            policy_override: None,
        }
    }
}

/// Verify every installed dependency of the project at `root`.
///
/// Returns the full run, passing or not. Configuration and operational
/// faults are returned as errors.
pub fn verify(root: &Path, options: &VerifyOptions) -> Result<VerificationRun> {
    verify_with_runner(root, options, &SystemRunner)
}

/// Like [`verify`], with a custom command runner.
pub fn verify_with_runner(
    root: &Path,
    options: &VerifyOptions,
    runner: &dyn CommandRunner,
) -> Result<VerificationRun> {
    // Load config
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| root.join(".depsig.toml"));
    let config = Config::load(&config_path)?;

    let source = ComposerSource::new(&config.install.vendor_dir);
    let install_mode = match options
        .install_mode_override
        .clone()
        .or_else(|| config.install.mode.clone())
    {
        Some(mode) => mode,
        None => source.install_mode(root)?,
    };

    let policy = options.policy_override.unwrap_or(config.policy.require);

    // Reported before the installed package list is even read.
    report::require_source_install(&install_mode)?;

    let deps = source.load(root)?;
    tracing::debug!(count = deps.len(), %policy, "verifying dependencies");

    let engine = Engine::new(Box::new(Git::new(config.git.binary.clone())), runner);
    report::run(&deps, &install_mode, &engine, policy, &config.locale)
}

/// Verify the project and fail with one consolidated error if any
/// dependency is not verified. This is the entry point for install hooks.
pub fn check(root: &Path, options: &VerifyOptions) -> Result<()> {
    let run = verify(root, options)?;
    report::enforce(&run)
}

/// Render a verification run in the specified format.
pub fn render_report(run: &VerificationRun, format: OutputFormat) -> Result<String> {
    output::render(run, format)
}
