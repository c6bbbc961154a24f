// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod errors;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scoring;

// Re-export commonly used types
pub use crate::analyzers::{default_analyzers, AnalyzerOutput, RepoAnalyzer, RepoContext};

pub use crate::complexity::{estimate, SourceEstimate, SourceFile, Strategy};

pub use crate::config::{load_config, QualityConfig, WeightTable};

pub use crate::errors::{Error, Result};

pub use crate::metrics::{numeric, MetricsBundle};

pub use crate::pipeline::{assess, collect_metrics};

pub use crate::report::{render_markdown, write_report, MarkdownWriter};

pub use crate::scoring::{compute_scores, compute_scores_with, Dimension, Grade, ScoreBundle, SubScores};
