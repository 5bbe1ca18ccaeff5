use crate::types::*;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "ge-updater";
pub const CONFIG_FILE_NAME: &str = "config.conf";
pub const CONFIG_SECTION: &str = "proton";

const KEY_LOCATION: &str = "proton_location";
const KEY_KEEP_OLD: &str = "keep_old";
const KEY_ASSET_SUFFIX: &str = "asset_suffix";

pub const ENV_CONFIG: &str = "GE_UPDATER_CONFIG";
pub const ENV_API_URL: &str = "GE_UPDATER_API_URL";
pub const ENV_KEEP_OLD: &str = "GE_UPDATER_KEEP_OLD";
pub const ENV_DOWNLOAD_DIR: &str = "GE_UPDATER_DOWNLOAD_DIR";

type Sections = HashMap<String, HashMap<String, String>>;

/// Resolve which settings file to read: the `--config` flag wins, then
/// `GE_UPDATER_CONFIG`, then `config.conf` in the working directory.
pub fn get_config_file_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return PathBuf::from(path);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_settings(config_path: &Path) -> Result<Settings> {
    tracing::debug!("Config file path: {}", config_path.display());

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Could not read config file at {}", config_path.display()))?;
    let home = dirs::home_dir().context("Could not determine home directory")?;

    let mut settings = parse_settings(&content, config_path, &home)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    tracing::debug!("Install directory: {}", settings.install_dir.display());
    Ok(settings)
}

pub fn parse_settings(content: &str, config_path: &Path, home: &Path) -> Result<Settings> {
    let sections = parse_ini(content, config_path)?;

    let required = |key: &str| -> Result<&String> {
        sections
            .get(CONFIG_SECTION)
            .and_then(|section| section.get(key))
            .ok_or_else(|| {
                UpdaterError::MissingConfig {
                    path: config_path.to_path_buf(),
                    section: CONFIG_SECTION.to_string(),
                    key: key.to_string(),
                }
                .into()
            })
    };

    let location = required(KEY_LOCATION)?;
    let keep_old = required(KEY_KEEP_OLD)?;

    let mut settings = Settings::new(install_dir_under(home, location));
    settings.keep_old = parse_keep_old(keep_old);

    let section = &sections[CONFIG_SECTION];
    if let Some(suffixes) = section.get(KEY_ASSET_SUFFIX) {
        let suffixes: Vec<String> = suffixes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !suffixes.is_empty() {
            settings.asset_suffixes = suffixes;
        }
    }

    Ok(settings)
}

pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_base) = lookup(ENV_API_URL) {
        settings.api_base = api_base.trim_end_matches('/').to_string();
    }
    if let Some(keep_old) = lookup(ENV_KEEP_OLD) {
        settings.keep_old = parse_keep_old(&keep_old);
    }
    if let Some(dir) = lookup(ENV_DOWNLOAD_DIR) {
        settings.download_dir = PathBuf::from(dir);
    }
}

/// Only the literal `False` asks for old versions to be removed.
pub fn parse_keep_old(value: &str) -> bool {
    value != "False"
}

/// `proton_location` is a fragment appended to the home directory, so a
/// leading separator must not turn it into an absolute path.
fn install_dir_under(home: &Path, location: &str) -> PathBuf {
    let fragment = location.trim_start_matches(['/', '\\']);
    if fragment.is_empty() {
        home.to_path_buf()
    } else {
        home.join(fragment)
    }
}

/// Minimal INI reader: `[section]` headers, `key = value` or `key: value`
/// pairs, and whole-line `#`/`;` comments. Keys are case-insensitive.
///
/// Not supported, and rejected or ignored rather than guessed at:
/// - `[DEFAULT]` is an ordinary section; its keys are not inherited.
/// - Indented continuation lines are not joined to the previous value.
/// - A comment after a section header (`[proton] ; note`) is an error.
fn parse_ini(content: &str, config_path: &Path) -> Result<Sections> {
    let mut sections = Sections::new();
    let mut current: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let invalid = || UpdaterError::InvalidConfigLine {
            path: config_path.to_path_buf(),
            line: index + 1,
            content: raw.to_string(),
        };

        if let Some(name) = line.strip_prefix('[') {
            let name = name.strip_suffix(']').ok_or_else(invalid)?.trim();
            sections.entry(name.to_string()).or_default();
            current = Some(name.to_string());
            continue;
        }

        let (key, value) = line
            .split_once(['=', ':'])
            .ok_or_else(invalid)?;
        let section = current.as_ref().ok_or_else(invalid)?;
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_lowercase(), value.trim().to_string());
    }

    Ok(sections)
}
