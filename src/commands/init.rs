use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# repo-quality configuration

# Inner tier: maintainability, security and structure form the core score.
# Outer tier: the core score plus every analyzer dimension.
# Each tier is normalized to sum to 1; null dimensions drop out.
[weights]
maintainability = 0.5
security = 0.3
structure = 0.2
core = 0.25
testing = 0.15
coverage = 0.1
documentation = 0.1
ci_cd = 0.1
compliance = 0.1
api = 0.1
monitoring = 0.1

[analysis]
max_complexity_files = 200
ignore_patterns = [
    "**/fixtures/**",
    "*.min.js"
]

[tools]
lizard = true
semgrep = true
timeout_secs = 300
clone_timeout_secs = 300
"#;

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);
    Ok(())
}

pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}
