use serde::Deserialize;

use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, thiserror::Error)]
#[error("invalid environment configuration: {0}")]
pub struct ConfigError(#[from] envy::Error);

/// Raw environment, read from `PORT`, `DATA_DIR` and `FRONTEND_DIST`.
#[derive(Debug, Clone, Deserialize)]
struct EnvConfig {
    #[serde(default = "default_port")]
    port: u16,
    data_dir: Option<PathBuf>,
    frontend_dist: Option<PathBuf>,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// Directory with a built client bundle, `None` runs API only.
    pub static_dir: Option<PathBuf>,
}

pub fn load_config() -> Result<Config, ConfigError> {
    let raw: EnvConfig = envy::from_env()?;
    Ok(resolve(raw, &base_dir()))
}

fn resolve(raw: EnvConfig, base: &Path) -> Config {
    let data_dir = raw.data_dir.unwrap_or_else(|| base.join("data"));

    let static_dir = match raw.frontend_dist {
        Some(dist) if dist.exists() => Some(dist),
        other => {
            if let Some(dist) = other {
                tracing::warn!(
                    "FRONTEND_DIST '{}' does not exist, ignoring it",
                    dist.display()
                );
            }
            let local = base.join("public");
            local.join("index.html").exists().then_some(local)
        }
    };

    Config {
        port: raw.port,
        data_dir,
        static_dir,
    }
}

/// Directory of the running executable, or the working directory.
fn base_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
