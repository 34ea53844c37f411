//! Per-dependency signature verification.
//!
//! The [`Engine`] asks a [`Vcs`] for the commands to run, executes them
//! through a [`CommandRunner`] and folds the results into one
//! [`DependencyRecord`] per dependency.

pub mod check;
pub mod engine;
pub mod policy;
pub mod record;
pub mod runner;
pub mod vcs;

pub use check::{CheckKind, SignatureCheck};
pub use engine::Engine;
pub use policy::SignaturePolicy;
pub use record::DependencyRecord;
pub use runner::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use vcs::{Git, Vcs};
