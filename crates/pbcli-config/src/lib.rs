//! Configuration for the `pb` command line.
//!
//! A single TOML record holding the account's API key, a hand-declared
//! field schema used by `config show` / `config set`, credential
//! resolution, and translation to `pbcli_core::ClientConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pbcli_core::ClientConfig;

/// Env var that relocates the config file.
pub const CONFIG_PATH_ENV: &str = "PB_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config field '{name}'")]
    UnknownField { name: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Pushbullet access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

// ── Field schema ────────────────────────────────────────────────────

/// One user-visible config field: its name, a one-line explanation and
/// how to read or write it.
#[derive(Debug, Clone, Copy)]
pub struct ConfigField {
    pub name: &'static str,
    pub help: &'static str,
    /// Masked in `config show` unless revealed.
    pub secret: bool,
    pub get: fn(&Config) -> Option<&str>,
    pub set: fn(&mut Config, Option<String>),
}

fn get_key(cfg: &Config) -> Option<&str> {
    cfg.key.as_deref()
}

fn set_key(cfg: &mut Config, value: Option<String>) {
    cfg.key = value;
}

/// All fields, in display order.
pub const CONFIG_FIELDS: &[ConfigField] = &[ConfigField {
    name: "key",
    help: "Pushbullet API key",
    secret: true,
    get: get_key,
    set: set_key,
}];

/// Look up a field by its exact name.
pub fn find_field(name: &str) -> Result<&'static ConfigField, ConfigError> {
    CONFIG_FIELDS
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| ConfigError::UnknownField { name: name.into() })
}

impl Config {
    /// Set `name` to `value`; an empty value clears the field.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let field = find_field(name)?;
        let value = (!value.is_empty()).then(|| value.to_owned());
        (field.set)(self, value);
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `PB_CONFIG` if set, otherwise the
/// platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "pbcli", "pbcli").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pbcli");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from `path`, with `PB_KEY` layered on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PB_").only(&["key"]));

    Ok(figment.extract()?)
}

/// Result of [`load_or_init_at`].
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub path: PathBuf,
    /// The file didn't exist and an empty one was written.
    pub created: bool,
}

/// Load config from `path`, writing an empty file first if there is none.
pub fn load_or_init_at(path: &Path) -> Result<Loaded, ConfigError> {
    let created = !path.exists();
    if created {
        save_config_to(path, &Config::default())?;
    }
    Ok(Loaded {
        config: load_config_from(path)?,
        path: path.to_owned(),
        created,
    })
}

/// [`load_or_init_at`] on the canonical path.
pub fn load_or_init() -> Result<Loaded, ConfigError> {
    load_or_init_at(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
///
/// Only the file's own contents are written; env overrides are not
/// persisted because callers pass the struct they mean to store.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str).map_err(write_err)?;
    Ok(())
}

/// Read only what is stored in the file at `path`, ignoring env
/// overrides. Used before rewriting it.
pub fn read_file_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path));
    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: an explicit override first, then the loaded
/// config (which already has `PB_KEY` layered over the file).
pub fn resolve_api_key(
    cfg: &Config,
    explicit: Option<&str>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |k: &&str| !k.is_empty();
    explicit
        .filter(non_empty)
        .or(cfg.key.as_deref().filter(non_empty))
        .map(|k| SecretString::from(k.to_owned()))
        .ok_or(ConfigError::NoCredentials)
}

/// Build a `ClientConfig` from the loaded config.
pub fn client_config(cfg: &Config, explicit_key: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let key = resolve_api_key(cfg, explicit_key)?;
    ClientConfig::new(key).map_err(|e| ConfigError::Validation {
        field: "endpoint".into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn schema_lists_the_key_field() {
        let names: Vec<_> = CONFIG_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["key"]);

        let field = find_field("key").unwrap();
        assert!(field.secret);
        assert_eq!(field.help, "Pushbullet API key");
        assert!(matches!(
            find_field("Key"),
            Err(ConfigError::UnknownField { name }) if name == "Key"
        ));
    }

    #[test]
    fn set_goes_through_the_schema() {
        let mut cfg = Config::default();
        cfg.set("key", "o.abc").unwrap();
        assert_eq!((find_field("key").unwrap().get)(&cfg), Some("o.abc"));

        cfg.set("key", "").unwrap();
        assert_eq!(cfg.key, None);

        assert!(cfg.set("color", "red").is_err());
    }

    #[test]
    fn init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = load_or_init_at(&path).unwrap();
        assert!(first.created);
        assert!(path.exists());

        let second = load_or_init_at(&path).unwrap();
        assert!(!second.created);
    }

    #[test]
    fn save_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config {
            key: Some("o.saved".into()),
        };

        save_config_to(&path, &cfg).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("key = \"o.saved\""));
        assert_eq!(read_file_config(&path).unwrap(), cfg);
    }

    #[test]
    fn write_failure_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("config.toml");
        std::fs::create_dir(&path).unwrap();

        let err = save_config_to(&path, &Config::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
    }

    #[test]
    fn env_key_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.toml", "key = \"o.file\"")?;

            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.key.as_deref(), Some("o.file"));

            jail.set_env("PB_KEY", "o.env");
            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.key.as_deref(), Some("o.env"));

            let stored = read_file_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(stored.key.as_deref(), Some("o.file"));
            Ok(())
        });
    }

    #[test]
    fn explicit_key_wins_and_empty_means_missing() {
        let cfg = Config {
            key: Some("o.file".into()),
        };
        let key = resolve_api_key(&cfg, Some("o.flag")).unwrap();
        assert_eq!(key.expose_secret(), "o.flag");

        let key = resolve_api_key(&cfg, None).unwrap();
        assert_eq!(key.expose_secret(), "o.file");

        let empty = Config {
            key: Some(String::new()),
        };
        assert!(matches!(
            resolve_api_key(&empty, None),
            Err(ConfigError::NoCredentials)
        ));
    }

    #[test]
    fn builds_client_config() {
        let cfg = Config {
            key: Some("o.abc".into()),
        };
        let client = client_config(&cfg, None).unwrap();
        assert_eq!(client.api_key.expose_secret(), "o.abc");
        assert!(client_config(&Config::default(), None).is_err());
    }
}
