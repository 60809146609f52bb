//! Configuration loader
//!
//! Loads [`BridgeConfig`] from environment variables or a file.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `BRIDGEKIT_SESSION_AUTH_URL` is set
//! 2. Otherwise a config file, explicit or probed
//! 3. JSON and TOML are both accepted, chosen by extension
//!
//! ## Environment Variables
//! - `BRIDGEKIT_SESSION_AUTH_URL`: session login endpoint (required)
//! - `BRIDGEKIT_KEY_MANAGER_AUTH_URL`: key manager login endpoint
//! - `BRIDGEKIT_SESSION_TTL_SECS`: assumed session lifetime
//! - `BRIDGEKIT_CONNECT_TIMEOUT_SECS`: TCP/TLS connect timeout
//! - `BRIDGEKIT_REQUEST_TIMEOUT_SECS`: overall request timeout
//! - `BRIDGEKIT_TRUST_STORE_FILE`: extra root certificates
//! - `BRIDGEKIT_TRUST_STORE_FORMAT`: `pem` (default) or `der`
//! - `BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS`: attempts on connection failure
//! - `BRIDGEKIT_LOG_LEVEL`: default log level
//! - `BRIDGEKIT_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! `bridgekit.{json,toml}` then `config.{json,toml}`, first in the working
//! directory, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bridgekit_domain::{
    ApiClientSettings, AuthenticationConfig, BridgeConfig, ConfigError, ConfigResult,
    LoggingConfig, TrustStoreConfig, TrustStoreFormat,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["bridgekit.json", "bridgekit.toml", "config.json", "config.toml"];

/// Load configuration, environment first, file second.
///
/// # Errors
/// Returns `ConfigError` when neither source yields a valid configuration.
pub fn load() -> ConfigResult<BridgeConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigError::Missing(key)) => {
            tracing::debug!(%key, "Environment configuration incomplete, trying file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from `BRIDGEKIT_*` environment variables.
///
/// # Errors
/// `ConfigError::Missing` without a session login URL, `ConfigError::Invalid`
/// for unparsable or rejected values.
pub fn load_from_env() -> ConfigResult<BridgeConfig> {
    let mut authentication = AuthenticationConfig::new(env_var("BRIDGEKIT_SESSION_AUTH_URL")?);
    authentication.key_manager_auth_url = std::env::var("BRIDGEKIT_KEY_MANAGER_AUTH_URL").ok();
    if let Some(ttl) = env_parse("BRIDGEKIT_SESSION_TTL_SECS")? {
        authentication.session_ttl_secs = ttl;
    }
    if let Some(timeout) = env_parse("BRIDGEKIT_CONNECT_TIMEOUT_SECS")? {
        authentication.connect_timeout_secs = timeout;
    }
    if let Some(timeout) = env_parse("BRIDGEKIT_REQUEST_TIMEOUT_SECS")? {
        authentication.request_timeout_secs = timeout;
    }
    if let Ok(file) = std::env::var("BRIDGEKIT_TRUST_STORE_FILE") {
        let format = match std::env::var("BRIDGEKIT_TRUST_STORE_FORMAT") {
            Ok(value) => trust_store_format(&value)?,
            Err(_) => TrustStoreFormat::default(),
        };
        authentication.trust_store = Some(TrustStoreConfig { file, format });
    }

    let mut api_client = ApiClientSettings::default();
    if let Some(attempts) = env_parse("BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS")? {
        api_client.connectivity_max_attempts = attempts;
    }

    let mut logging = LoggingConfig::default();
    if let Ok(level) = std::env::var("BRIDGEKIT_LOG_LEVEL") {
        logging.level = level;
    }
    logging.json = env_bool("BRIDGEKIT_LOG_JSON", false);

    let config = BridgeConfig { authentication, api_client, logging };
    config.validate()?;
    Ok(config)
}

fn trust_store_format(value: &str) -> ConfigResult<TrustStoreFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pem" => Ok(TrustStoreFormat::Pem),
        "der" => Ok(TrustStoreFormat::Der),
        other => Err(ConfigError::Invalid(format!(
            "BRIDGEKIT_TRUST_STORE_FORMAT must be pem or der, got {other}"
        ))),
    }
}

/// Load configuration from a file.
///
/// `None` probes the standard locations (see [`probe_config_paths`]).
///
/// # Errors
/// `ConfigError::File` when the file is missing or unreadable,
/// `ConfigError::Invalid` when it does not parse or validate.
pub fn load_from_file(path: Option<PathBuf>) -> ConfigResult<BridgeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::File(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::File("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError::File(format!("Failed to read {}: {e}", config_path.display())))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> ConfigResult<BridgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Invalid(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Invalid(format!("Invalid JSON format: {e}"))),
        _ => Err(ConfigError::File(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> ConfigResult<String> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

fn env_parse<T>(key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::{Builder, NamedTempFile};

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 10] = [
        "BRIDGEKIT_SESSION_AUTH_URL",
        "BRIDGEKIT_KEY_MANAGER_AUTH_URL",
        "BRIDGEKIT_SESSION_TTL_SECS",
        "BRIDGEKIT_CONNECT_TIMEOUT_SECS",
        "BRIDGEKIT_REQUEST_TIMEOUT_SECS",
        "BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS",
        "BRIDGEKIT_LOG_LEVEL",
        "BRIDGEKIT_LOG_JSON",
        "BRIDGEKIT_TRUST_STORE_FILE",
        "BRIDGEKIT_TRUST_STORE_FORMAT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("BRIDGEKIT_TEST_BOOL_ON", "ON");
        std::env::set_var("BRIDGEKIT_TEST_BOOL_OFF", "no");

        assert!(env_bool("BRIDGEKIT_TEST_BOOL_ON", false));
        assert!(!env_bool("BRIDGEKIT_TEST_BOOL_OFF", true));
        assert!(env_bool("BRIDGEKIT_TEST_BOOL_MISSING", true));

        std::env::remove_var("BRIDGEKIT_TEST_BOOL_ON");
        std::env::remove_var("BRIDGEKIT_TEST_BOOL_OFF");
    }

    #[test]
    fn load_from_env_reads_all_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BRIDGEKIT_SESSION_AUTH_URL", "https://pod/sessionauth/v1/authenticate");
        std::env::set_var("BRIDGEKIT_KEY_MANAGER_AUTH_URL", "https://km/keyauth/v1/authenticate");
        std::env::set_var("BRIDGEKIT_SESSION_TTL_SECS", "600");
        std::env::set_var("BRIDGEKIT_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS", "5");
        std::env::set_var("BRIDGEKIT_LOG_LEVEL", "debug");
        std::env::set_var("BRIDGEKIT_LOG_JSON", "true");

        let config = load_from_env().expect("env config");
        clear_env();

        assert_eq!(config.authentication.session_auth_url, "https://pod/sessionauth/v1/authenticate");
        assert_eq!(
            config.authentication.key_manager_auth_url.as_deref(),
            Some("https://km/keyauth/v1/authenticate")
        );
        assert_eq!(config.authentication.session_ttl_secs, 600);
        assert_eq!(config.authentication.request_timeout_secs, 5);
        assert_eq!(config.api_client.connectivity_max_attempts, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn load_from_env_requires_session_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert_eq!(err, ConfigError::Missing("BRIDGEKIT_SESSION_AUTH_URL".to_string()));
    }

    #[test]
    fn load_from_env_rejects_bad_numbers() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BRIDGEKIT_SESSION_AUTH_URL", "https://pod/login");
        std::env::set_var("BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS", "many");
        let err = load_from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        std::env::set_var("BRIDGEKIT_CONNECTIVITY_MAX_ATTEMPTS", "0");
        let err = load_from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        clear_env();
    }

    #[test]
    fn load_from_env_reads_trust_store() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BRIDGEKIT_SESSION_AUTH_URL", "https://pod/login");
        std::env::set_var("BRIDGEKIT_TRUST_STORE_FILE", "/etc/bridge/ca.der");
        std::env::set_var("BRIDGEKIT_TRUST_STORE_FORMAT", "DER");
        let config = load_from_env().expect("env config");
        assert_eq!(
            config.authentication.trust_store,
            Some(TrustStoreConfig { file: "/etc/bridge/ca.der".into(), format: TrustStoreFormat::Der })
        );

        std::env::set_var("BRIDGEKIT_TRUST_STORE_FORMAT", "jks");
        let err = load_from_env().unwrap_err();
        clear_env();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_from_json_file() {
        let file = temp_config(
            ".json",
            r#"{
                "authentication": {
                    "session_auth_url": "https://pod/login",
                    "request_timeout_secs": 12
                },
                "api_client": { "connectivity_max_attempts": 2 }
            }"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("json config");
        assert_eq!(config.authentication.request_timeout_secs, 12);
        assert_eq!(config.api_client.connectivity_max_attempts, 2);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn load_from_toml_file() {
        let file = temp_config(
            ".toml",
            r#"
                [authentication]
                session_auth_url = "https://pod/login"
                key_manager_auth_url = "https://km/login"

                [logging]
                level = "warn"
                json = true
            "#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("toml config");
        assert_eq!(config.authentication.key_manager_auth_url.as_deref(), Some("https://km/login"));
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn load_from_file_errors() {
        let missing = load_from_file(Some(PathBuf::from("/nonexistent/bridgekit.json"))).unwrap_err();
        assert!(matches!(missing, ConfigError::File(_)));

        let yaml = temp_config(".yaml", "authentication: {}");
        let unsupported = load_from_file(Some(yaml.path().to_path_buf())).unwrap_err();
        assert!(matches!(unsupported, ConfigError::File(_)));

        let broken = temp_config(".json", "{ not json");
        let invalid = load_from_file(Some(broken.path().to_path_buf())).unwrap_err();
        assert!(matches!(invalid, ConfigError::Invalid(_)));

        let empty_url = temp_config(".json", r#"{"authentication": {"session_auth_url": ""}}"#);
        let rejected = load_from_file(Some(empty_url.path().to_path_buf())).unwrap_err();
        assert!(matches!(rejected, ConfigError::Missing(_)));
    }
}
