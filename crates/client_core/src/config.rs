use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::error::SettingsError;

pub const DEFAULT_SETTINGS_FILE: &str = "predictor.toml";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

/// How a new submission treats requests that are still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Every request runs to completion; the last response to arrive wins.
    #[default]
    LastResponseWins,
    /// A new submission cancels the previous one, whose late response is ignored.
    SupersedePrevious,
}

impl FromStr for OverlapPolicy {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_response_wins" => Ok(Self::LastResponseWins),
            "supersede_previous" => Ok(Self::SupersedePrevious),
            _ => Err(SettingsError::InvalidValue {
                key: "overlap".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: Option<u64>,
    pub clear_result_on_failure: bool,
    pub clear_error_on_edit: bool,
    pub overlap: OverlapPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: None,
            clear_result_on_failure: false,
            clear_error_on_edit: false,
            overlap: OverlapPolicy::default(),
        }
    }
}

impl ClientSettings {
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Result<Self, SettingsError> {
        self.request_timeout_secs = Some(validate_timeout(secs)?);
        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
        if let Some(v) = file.clear_result_on_failure {
            self.clear_result_on_failure = v;
        }
        if let Some(v) = file.clear_error_on_edit {
            self.clear_error_on_edit = v;
        }
        if let Some(v) = file.overlap {
            self.overlap = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    clear_result_on_failure: Option<bool>,
    clear_error_on_edit: Option<bool>,
    overlap: Option<OverlapPolicy>,
}

/// Loads settings from defaults, then the settings file, then the process
/// environment.
///
/// An explicit `path` must exist; the implicit `predictor.toml` in the working
/// directory is optional.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    load_settings_from(path, |key| std::env::var(key).ok())
}

pub fn load_settings_from<F>(path: Option<&Path>, env: F) -> Result<ClientSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ClientSettings::default();

    let file = match path {
        Some(path) => Some(read_settings_file(path)?),
        None => match read_settings_file(Path::new(DEFAULT_SETTINGS_FILE)) {
            Ok(file) => Some(file),
            Err(SettingsError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                None
            }
            Err(err) => return Err(err),
        },
    };
    if let Some(file) = file {
        settings.apply_file(file);
    }

    if let Some(v) = read_non_empty(&env, "PREDICTION_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = read_non_empty(&env, "APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = read_non_empty(&env, "APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .trim()
            .parse::<u64>()
            .map_err(|_| SettingsError::InvalidValue {
                key: "APP__REQUEST_TIMEOUT_SECS".to_string(),
                value: v.clone(),
            })?;
        settings.request_timeout_secs = Some(secs);
    }

    if let Some(v) = read_non_empty(&env, "APP__OVERLAP") {
        settings.overlap = v.parse()?;
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    if let Some(secs) = settings.request_timeout_secs {
        validate_timeout(secs)?;
    }

    Ok(settings)
}

/// Validates a base url and strips trailing slashes so `/predict` can be
/// appended verbatim.
pub fn normalize_base_url(raw: &str) -> Result<String, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }

    Ok(trimmed.to_string())
}

fn validate_timeout(secs: u64) -> Result<u64, SettingsError> {
    if secs == 0 {
        return Err(SettingsError::InvalidValue {
            key: "request_timeout_secs".to_string(),
            value: secs.to_string(),
        });
    }
    Ok(secs)
}

fn read_settings_file(path: &Path) -> Result<FileSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: PathBuf::from(path),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

fn read_non_empty<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
