//! Locating and parsing the toolkit config and filter files.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use gptk_core::ToolkitConfig;
use gptk_model::Filter;
use serde::de::DeserializeOwned;

const CONFIG_PATH_VAR: &str = "GPTK_CONFIG_PATH";
const CONFIG_JSON_VAR: &str = "GPTK_CONFIG_JSON";
const DEFAULT_FILES: [&str; 3] = ["gptk.toml", "gptk.json", "config/gptk.toml"];

/// Where the active [`ToolkitConfig`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Flag(path) => write!(f, "--config {}", path.display()),
            ConfigSource::EnvPath(path) => write!(f, "${CONFIG_PATH_VAR} {}", path.display()),
            ConfigSource::EnvInline => write!(f, "${CONFIG_JSON_VAR}"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Default => f.write_str("defaults"),
        }
    }
}

/// Resolves the toolkit config.
///
/// Evaluation order:
/// 1) the `--config` flag,
/// 2) `$GPTK_CONFIG_PATH` (TOML or JSON file),
/// 3) `$GPTK_CONFIG_JSON` (inline JSON),
/// 4) `gptk.toml`, `gptk.json` or `config/gptk.toml` in the working directory,
/// 5) defaults.
pub fn load_config(flag: Option<&Path>) -> anyhow::Result<(ToolkitConfig, ConfigSource)> {
    if let Some(path) = flag {
        let config = load_file(path, "toolkit config")?;
        return Ok((config, ConfigSource::Flag(path.to_path_buf())));
    }

    if let Ok(raw) = env::var(CONFIG_PATH_VAR)
        && !raw.trim().is_empty()
    {
        let path = PathBuf::from(raw);
        let config = load_file(&path, "toolkit config")?;
        return Ok((config, ConfigSource::EnvPath(path)));
    }

    if let Ok(raw) = env::var(CONFIG_JSON_VAR)
        && !raw.trim().is_empty()
    {
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
        return Ok((config, ConfigSource::EnvInline));
    }

    if let Some(path) = DEFAULT_FILES.iter().map(PathBuf::from).find(|path| path.is_file()) {
        let config = load_file(&path, "toolkit config")?;
        return Ok((config, ConfigSource::File(path)));
    }

    Ok((ToolkitConfig::default(), ConfigSource::Default))
}

/// Reads a filter file; a missing path yields the empty filter.
pub fn load_filter(path: Option<&Path>) -> anyhow::Result<Filter> {
    match path {
        Some(path) => load_file(path, "filter"),
        None => Ok(Filter::default()),
    }
}

/// Parses `path` as JSON or TOML by extension, otherwise tries TOML then JSON.
pub fn load_file<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("invalid {what} {}", path.display())),
        Some("toml") | Some("tml") => toml::from_str(&contents)
            .map_err(|err| anyhow!("invalid {what} {}: {err}", path.display())),
        _ => parse_from_str(&contents, &path.display().to_string(), what),
    }
}

fn parse_from_str<T: DeserializeOwned>(
    contents: &str,
    origin: &str,
    what: &str,
) -> anyhow::Result<T> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse {what} {origin}: toml error: {toml_err}; json error: {json_err}"
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptk_model::{IntervalType, MatchType};

    #[test]
    fn toml_filter_uses_the_wire_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.toml");
        fs::write(
            &path,
            r#"
lowerBoundaryDate = "2023-01-01"
intervalType = "exclude"
fileNameRegex = "^IMG_"
fileNameMatchType = "exclude"
favorite = true
"#,
        )
        .unwrap();

        let filter = load_filter(Some(&path)).unwrap();
        assert_eq!(filter.lower_boundary_date.as_deref(), Some("2023-01-01"));
        assert_eq!(filter.interval_type, IntervalType::Exclude);
        assert_eq!(filter.file_name_match_type, MatchType::Exclude);
        assert_eq!(filter.favorite, Some(true));
    }

    #[test]
    fn extensionless_files_fall_back_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let raw = r#"{"operation_size": 40, "similarity": {"workers": 2}}"#;
        fs::write(&path, raw).unwrap();

        let config: ToolkitConfig = load_file(&path, "toolkit config").unwrap();
        assert_eq!(config.operation_size, 40);
        assert_eq!(config.similarity.workers, 2);
        assert_eq!(config.info_size, 5_000);
    }

    #[test]
    fn explicit_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gptk.toml");
        fs::write(&path, "info_size = 10\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.info_size, 10);
        assert_eq!(source, ConfigSource::Flag(path));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_filter(Some(Path::new("/nonexistent/filter.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/filter.json"));
    }
}
