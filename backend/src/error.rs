use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    /// One line per problem, for startup logging.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ConfigError::Invalid(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlertError {
    #[error("no signal-source prices available for both assets")]
    MissingSignalSource,
}
