use std::process::Command;

use crate::error::{Result, VerifyError};

/// A program plus its arguments, as handed to a [`CommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status and combined output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code, `-1` when the process was terminated by a signal.
    pub status: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external commands synchronously.
///
/// A non-zero exit is a normal result. `Err` is reserved for commands that
/// could not be executed at all.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| VerifyError::CommandSpawn {
                command: invocation.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = Invocation::new("git", ["-C", "/tmp/my vendor/pkg", "verify-tag", "v1"]);
        assert_eq!(inv.to_string(), "git -C '/tmp/my vendor/pkg' verify-tag v1");
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let inv = Invocation::new("depsig-test-no-such-binary", ["--version"]);
        let err = SystemRunner.run(&inv).unwrap_err();
        assert!(matches!(err, VerifyError::CommandSpawn { .. }));
        assert!(err.to_string().contains("depsig-test-no-such-binary --version"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_status_and_both_streams() {
        let inv = Invocation::new("sh", ["-c", "echo out; echo err >&2; exit 3"]);
        let out = SystemRunner.run(&inv).unwrap();
        assert_eq!(out.status, 3);
        assert!(!out.success());
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }
}
