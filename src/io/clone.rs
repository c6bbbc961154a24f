use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use git2::build::RepoBuilder;
use git2::{ErrorCode, FetchOptions, RemoteCallbacks};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::errors::{Error, Result};

/// Directory under analysis: either a caller-owned local checkout or a
/// temporary clone removed on drop.
#[derive(Debug)]
pub enum Workspace {
    Local(PathBuf),
    Cloned { url: String, dir: TempDir },
}

impl Workspace {
    pub fn root(&self) -> &Path {
        match self {
            Self::Local(path) => path,
            Self::Cloned { dir, .. } => dir.path(),
        }
    }

    pub fn is_clone(&self) -> bool {
        matches!(self, Self::Cloned { .. })
    }

    /// Keep a temporary clone on disk and return its path
    pub fn persist(self) -> PathBuf {
        match self {
            Self::Local(path) => path,
            Self::Cloned { dir, .. } => dir.keep(),
        }
    }
}

/// Use `source` in place when it is an existing directory, otherwise treat
/// it as a git URL and make a shallow clone.
pub fn prepare_workspace(source: &str, timeout_secs: u64) -> Result<Workspace> {
    let local = Path::new(source);
    if local.is_dir() {
        debug!("Analyzing local directory {}", local.display());
        return Ok(Workspace::Local(local.to_path_buf()));
    }

    let dir = tempfile::Builder::new().prefix("repo-quality-").tempdir()?;
    clone_into(source, dir.path(), timeout_secs)?;
    Ok(Workspace::Cloned {
        url: source.to_string(),
        dir,
    })
}

/// Shallow clone, aborted once `timeout_secs` have elapsed
pub fn clone_into(url: &str, dest: &Path, timeout_secs: u64) -> Result<()> {
    let started = Instant::now();
    let budget = Duration::from_secs(timeout_secs);

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(move |_| timeout_secs == 0 || started.elapsed() < budget);

    let mut fetch = FetchOptions::new();
    fetch.depth(1);
    fetch.remote_callbacks(callbacks);

    info!("Cloning {}", url);
    RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, dest)
        .map_err(|e| {
            if e.code() == ErrorCode::User {
                Error::timeout(format!("clone of {}", url), timeout_secs)
            } else {
                Error::Clone {
                    url: url.to_string(),
                    message: e.message().to_string(),
                }
            }
        })?;

    debug!("Cloned {} in {:.1}s", url, started.elapsed().as_secs_f64());
    Ok(())
}
