//! CLI command implementations.
//!
//! - **assess**: clone or open a repository, run the analyzers, score and
//!   write the report
//! - **score**: score a metrics bundle gathered earlier
//! - **init**: write a default configuration file

pub mod assess;
pub mod init;
pub mod score;

pub use assess::{run_assess, AssessConfig, AssessOutcome};
pub use init::init_config;
pub use score::{run_score, ScoreConfig};

use std::path::Path;

use crate::config::{load_config, load_config_from, QualityConfig};

/// Explicit `--config` file, or discovery from the working directory
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<QualityConfig> {
    match explicit {
        Some(path) => load_config_from(path),
        None => Ok(load_config()),
    }
}
