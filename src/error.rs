use thiserror::Error;

pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error(
        "Dependencies must be installed from source (preferred-install = \"source\"), \
         but the installation mode is '{actual}'"
    )]
    InstallMode { actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to execute `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} dependency(ies) failed signature verification:\n\n{report}")]
    Unverified { count: usize, report: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VerifyError {
    /// 1 when dependencies failed verification, 2 when the tool itself could not do its job.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unverified { .. } => 1,
            _ => 2,
        }
    }
}
