use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repo-quality")]
#[command(about = "Repository quality assessment and scoring", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a repository and write a quality report
    Assess {
        /// Git URL or path to a local checkout
        repo: String,

        /// Markdown report destination
        #[arg(short, long, default_value = "report.md")]
        output: PathBuf,

        /// Exit with status 1 when the overall score is below this value
        #[arg(long = "fail-under", value_name = "SCORE")]
        fail_under: Option<f64>,

        /// Configuration file (defaults to .repo-quality.toml discovery)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the score bundle as JSON
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,

        /// Keep the temporary clone and print its location
        #[arg(long = "keep-clone")]
        keep_clone: bool,

        /// Suppress progress spinners and the terminal summary
        #[arg(short, long)]
        quiet: bool,

        /// Increase log verbosity (-v info, -vv debug, -vvv trace)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },

    /// Score a previously gathered metrics bundle without running analyzers
    Score {
        /// JSON object with merged analyzer metrics
        metrics: PathBuf,

        /// Markdown report destination (prints the score bundle when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file supplying the weight table
        #[arg(long)]
        config: Option<PathBuf>,

        /// Increase log verbosity
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },

    /// Write a default .repo-quality.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    pub fn verbosity(&self) -> u8 {
        match self {
            Self::Assess { verbose, .. } | Self::Score { verbose, .. } => *verbose,
            Self::Init { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_assess_defaults() {
        let cli = Cli::parse_from(["repo-quality", "assess", "https://example.com/r.git"]);
        match cli.command {
            Commands::Assess {
                repo,
                output,
                fail_under,
                keep_clone,
                quiet,
                verbose,
                ..
            } => {
                assert_eq!(repo, "https://example.com/r.git");
                assert_eq!(output, PathBuf::from("report.md"));
                assert_eq!(fail_under, None);
                assert!(!keep_clone);
                assert!(!quiet);
                assert_eq!(verbose, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_assess_flags() {
        let cli = Cli::parse_from([
            "repo-quality",
            "assess",
            ".",
            "-o",
            "out.md",
            "--fail-under",
            "72.5",
            "--json",
            "scores.json",
            "--keep-clone",
            "-q",
            "-vv",
        ]);
        assert_eq!(cli.command.verbosity(), 2);
        match cli.command {
            Commands::Assess {
                output,
                fail_under,
                json,
                keep_clone,
                quiet,
                ..
            } => {
                assert_eq!(output, PathBuf::from("out.md"));
                assert_eq!(fail_under, Some(72.5));
                assert_eq!(json, Some(PathBuf::from("scores.json")));
                assert!(keep_clone);
                assert!(quiet);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
