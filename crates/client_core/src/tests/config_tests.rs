use super::*;

use std::{
    collections::HashMap,
    env, fs,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static TEMP_DIRS: AtomicUsize = AtomicUsize::new(0);

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let seq = TEMP_DIRS.fetch_add(1, Ordering::Relaxed);
    let dir = env::temp_dir().join(format!("predictor_settings_test_{suffix}_{seq}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("predictor.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

/// Loads with an empty settings file so a `predictor.toml` in the working
/// directory cannot leak into the result.
fn load_with_empty_file(
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let path = temp_settings_file("");
    let loaded = load_settings_from(Some(&path), env);
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    loaded
}

#[test]
fn defaults_point_at_local_service() {
    let settings = load_with_empty_file(env_from(&[])).expect("load");
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.api_base_url, "http://127.0.0.1:5000");
    assert!(settings.request_timeout().is_none());
}

#[test]
fn file_values_are_applied_and_env_overrides_url() {
    let path = temp_settings_file(
        r#"
api_base_url = "http://file-host:9000/"
request_timeout_secs = 12
clear_result_on_failure = true
overlap = "supersede_previous"
"#,
    );

    let from_file = load_settings_from(Some(&path), env_from(&[])).expect("load");
    assert_eq!(from_file.api_base_url, "http://file-host:9000");
    assert_eq!(from_file.request_timeout(), Some(Duration::from_secs(12)));
    assert!(from_file.clear_result_on_failure);
    assert!(!from_file.clear_error_on_edit);
    assert_eq!(from_file.overlap, OverlapPolicy::SupersedePrevious);

    let overridden = load_settings_from(
        Some(&path),
        env_from(&[
            ("PREDICTION_API_URL", "http://env-host:1234"),
            ("APP__OVERLAP", "last_response_wins"),
        ]),
    )
    .expect("load");
    assert_eq!(overridden.api_base_url, "http://env-host:1234");
    assert_eq!(overridden.overlap, OverlapPolicy::LastResponseWins);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn app_prefixed_url_wins_over_plain_variable() {
    let settings = load_with_empty_file(
        env_from(&[
            ("PREDICTION_API_URL", "http://plain:1"),
            ("APP__API_URL", "https://prefixed:2/api/"),
        ]),
    )
    .expect("load");
    assert_eq!(settings.api_base_url, "https://prefixed:2/api");
}

#[test]
fn blank_env_values_are_ignored() {
    let settings =
        load_with_empty_file(env_from(&[("PREDICTION_API_URL", "   ")])).expect("load");
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let missing = env::temp_dir().join("predictor_settings_does_not_exist.toml");
    let err = load_settings_from(Some(&missing), env_from(&[])).expect_err("must fail");
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = temp_settings_file("api_base_url = [not toml");
    let err = load_settings_from(Some(&path), env_from(&[])).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn rejects_non_http_urls_and_zero_timeout() {
    assert!(matches!(
        normalize_base_url("ftp://example.com"),
        Err(SettingsError::InvalidUrl { .. })
    ));
    assert!(matches!(
        normalize_base_url("not a url"),
        Err(SettingsError::InvalidUrl { .. })
    ));
    assert!(matches!(
        normalize_base_url("http://example.com/?q=1"),
        Err(SettingsError::InvalidUrl { .. })
    ));

    let err = load_with_empty_file(env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]))
        .expect_err("zero timeout");
    assert!(matches!(err, SettingsError::InvalidValue { .. }));

    let err = load_with_empty_file(env_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]))
        .expect_err("non numeric timeout");
    assert!(matches!(err, SettingsError::InvalidValue { .. }));
}

#[test]
fn builder_overrides_validate_input() {
    let settings = ClientSettings::default()
        .with_api_base_url("http://cli-host:8080//")
        .expect("url")
        .with_request_timeout_secs(3)
        .expect("timeout");
    assert_eq!(settings.api_base_url, "http://cli-host:8080");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(3)));

    assert!(ClientSettings::default()
        .with_request_timeout_secs(0)
        .is_err());
}

#[test]
fn overlap_policy_parses_case_insensitively() {
    assert_eq!(
        "Supersede_Previous".parse::<OverlapPolicy>().expect("parse"),
        OverlapPolicy::SupersedePrevious
    );
    assert!("newest".parse::<OverlapPolicy>().is_err());
}
