use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_FILE: &str = "expenses.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url {0:?} must be an http or https address")]
    UnsupportedBaseUrl(String),
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where the expense store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: Url,
}

impl ClientSettings {
    pub fn new(base_url: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Defaults, then the config file, then `EXPENSES_BASE_URL` / `APP__BASE_URL`,
    /// then `base_url_override`. A missing file is only an error when the
    /// path was given explicitly.
    pub fn load(
        config_path: Option<&Path>,
        base_url_override: Option<&str>,
    ) -> Result<Self, SettingsError> {
        load_with(config_path, base_url_override, |key| std::env::var(key).ok())
    }
}

fn load_with(
    config_path: Option<&Path>,
    base_url_override: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut base_url = DEFAULT_BASE_URL.to_string();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, String>>(&raw).map_err(|source| {
                SettingsError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
            if let Some(v) = file_cfg.get("base_url") {
                base_url = v.clone();
            }
        }
        Err(source) if required || source.kind() != io::ErrorKind::NotFound => {
            return Err(SettingsError::Read { path, source });
        }
        Err(_) => {}
    }

    if let Some(v) = lookup("EXPENSES_BASE_URL") {
        base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        base_url = v;
    }
    if let Some(v) = base_url_override {
        base_url = v.to_string();
    }

    ClientSettings::new(&base_url)
}

fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw.trim()).map_err(|source| SettingsError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(SettingsError::UnsupportedBaseUrl(raw.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_to_local_service() {
        let settings = ClientSettings::new(DEFAULT_BASE_URL).expect("default");
        assert_eq!(settings.base_url.as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_with(Some(Path::new("/nonexistent/expenses.toml")), None, no_env)
            .expect_err("should fail");
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            ClientSettings::new("not a url"),
            Err(SettingsError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ClientSettings::new("mailto:someone@example.com"),
            Err(SettingsError::UnsupportedBaseUrl(_))
        ));
    }

    #[test]
    fn file_then_env_then_override() {
        let mut file = config_file();
        writeln!(file, r#"base_url = "http://file.test:8000""#).expect("write");

        let from_file = load_with(Some(file.path()), None, no_env).expect("file");
        assert_eq!(from_file.base_url.host_str(), Some("file.test"));

        let from_env = load_with(Some(file.path()), None, |key| {
            (key == "EXPENSES_BASE_URL").then(|| "http://env.test".to_string())
        })
        .expect("env");
        assert_eq!(from_env.base_url.host_str(), Some("env.test"));

        let overridden =
            load_with(Some(file.path()), Some("http://flag.test:9000"), no_env).expect("flag");
        assert_eq!(overridden.base_url.port(), Some(9000));
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = config_file();
        writeln!(file, "base_url = 8000").expect("write");
        let err = load_with(Some(file.path()), None, no_env).expect_err("should fail");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    fn config_file() -> NamedTempFile {
        tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("create config")
    }
}
