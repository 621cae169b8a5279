use crate::config::components::global::ConsoleConfig;
use crate::config::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "console.yml";

pub const ENV_ADDR: &str = "CONSOLE_ADDR";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY: &str = "API_KEY";

/// Reads `console.yml` from `config_path` (a directory or the file itself),
/// falling back to the working directory. A missing file yields defaults.
pub fn read_config(config_path: Option<PathBuf>) -> Result<ConsoleConfig, ConfigError> {
    let config_file = resolve_config_file(config_path)?;

    let mut config = if config_file.exists() {
        log::info!("loading console config from {}", config_file.display());
        let file = fs::File::open(&config_file)?;
        let cfg: Option<ConsoleConfig> = serde_yaml::from_reader(file)?;
        cfg.unwrap_or_default()
    } else {
        log::info!(
            "no config found at {}, using defaults",
            config_file.display()
        );
        ConsoleConfig::default()
    };

    let config_root = config_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if let Some(seed) = config.seed.take() {
        let resolved = resolve_path(&config_root, &seed);
        if !resolved.exists() {
            return Err(ConfigError::incorrect_path(resolved));
        }
        config.seed = Some(resolved);
    }
    if let Some(dir) = config.server.static_dir.take() {
        config.server.static_dir = Some(resolve_path(&config_root, &dir));
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment overrides through `lookup` so callers (and tests)
/// control where values come from.
pub fn apply_env_overrides<F>(config: &mut ConsoleConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // blank variables count as unset
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(addr) = non_blank(ENV_ADDR) {
        config.server.addr = addr;
    }
    if config.genai.api_key.is_none() {
        config.genai.api_key = non_blank(ENV_GEMINI_API_KEY).or_else(|| non_blank(ENV_API_KEY));
    }
}

fn resolve_config_file(config_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match config_path {
        Some(path) if path.is_dir() => Ok(path.join(CONFIG_FILE_NAME)),
        Some(path) if path.extension().is_some() => Ok(path),
        Some(path) => Err(ConfigError::incorrect_path(path)),
        None => Ok(PathBuf::from(CONFIG_FILE_NAME)),
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
