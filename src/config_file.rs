//! Configuration file handling for multiservice
//!
//! Loading only checks that the file is a YAML mapping holding the required keys. Values
//! are kept as parsed and converted when a command or service actually uses them, so a
//! malformed entry only fails the invocations that touch it.

use std::path::PathBuf;

use log::debug;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.multiservice.yml";

/// Top-level keys every configuration must define
pub const REQUIRED_KEYS: [&str; 3] = ["root", "services", "commands"];

/// Errors that can occur while loading or reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse YAML config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Config file {0} is not a mapping of keys to values")]
    NotAMapping(PathBuf),
    #[error("Config misses required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
    #[error("Invalid value for `{key}` in config: expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Text of a scalar. YAML happily types `web: 2024` as a number, so numbers and booleans
/// count as their text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_at(key: &str, value: &Value) -> Result<String, ConfigError> {
    scalar_text(value).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        expected: "a string",
        found: describe(value),
    })
}

fn optional_text_at(key: &str, value: &Value) -> Result<Option<String>, ConfigError> {
    match value {
        Value::Null => Ok(None),
        other => text_at(key, other).map(Some),
    }
}

/// A top-level name-to-text mapping (`services` or `commands`), kept exactly as parsed
#[derive(Debug, Clone)]
pub struct Section {
    key: &'static str,
    value: Value,
}

impl Section {
    fn new(key: &'static str, value: Value) -> Self {
        Self { key, value }
    }

    fn mapping(&self) -> Result<&Mapping, ConfigError> {
        self.value
            .as_mapping()
            .ok_or_else(|| ConfigError::InvalidValue {
                key: self.key.to_string(),
                expected: "a mapping",
                found: describe(&self.value),
            })
    }

    /// Exact-key lookup, no case folding. Only the entry found is converted to text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the section is not a mapping or the entry
    /// found is not a scalar.
    pub fn get(&self, name: &str) -> Result<Option<String>, ConfigError> {
        let found = self
            .mapping()?
            .iter()
            .find(|(key, _)| scalar_text(key).as_deref() == Some(name));
        match found {
            Some((_, value)) => text_at(&format!("{}.{name}", self.key), value).map(Some),
            None => Ok(None),
        }
    }

    /// Look up a service directory by name: the exact key first, then the upper-cased key.
    ///
    /// An exact match always wins, so `api` finds `api` even when `API` is also declared.
    ///
    /// # Errors
    ///
    /// See [`Section::get`].
    pub fn resolve(&self, name: &str) -> Result<Option<String>, ConfigError> {
        match self.get(name)? {
            Some(found) => Ok(Some(found)),
            None => self.get(&name.to_uppercase()),
        }
    }

    /// Entry names in the order the config declares them
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the section is not a mapping or a key is not
    /// a scalar.
    pub fn names(&self) -> Result<Vec<String>, ConfigError> {
        self.mapping()?
            .keys()
            .map(|key| text_at(&format!("{} key", self.key), key))
            .collect()
    }
}

/// Loaded multiservice configuration
#[derive(Debug, Clone)]
pub struct Config {
    root: Value,
    pub services: Section,
    pub commands: Section,
    template: Value,
    editor: Value,
    /// Where this config was read from, after `~` expansion
    pub path: PathBuf,
}

impl Config {
    /// Reads, parses and validates the configuration at `path`.
    ///
    /// A leading `~` in `path` is expanded first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file cannot be read,
    /// `ConfigError::Parse`/`ConfigError::NotAMapping` if it is not a YAML mapping, or
    /// `ConfigError::MissingKeys` listing every absent required key.
    pub fn load(path: &str) -> Result<Config, ConfigError> {
        let full_path = expand_path(path);
        debug!("Loading config file: {}", full_path.display());
        let contents =
            std::fs::read_to_string(&full_path).map_err(|e| ConfigError::ConfigNotFound {
                path: full_path.clone(),
                source: e,
            })?;
        Self::from_yaml(&contents, full_path)
    }

    /// Parses and validates YAML text that was read from `path`.
    ///
    /// Only the presence of the required keys is checked, values are not inspected.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn from_yaml(contents: &str, path: PathBuf) -> Result<Config, ConfigError> {
        let value: Value = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        let Value::Mapping(mut mapping) = value else {
            return Err(ConfigError::NotAMapping(path));
        };
        validate_required_keys(&mapping)?;

        let mut take = |key: &str| mapping.remove(key).unwrap_or(Value::Null);
        Ok(Config {
            root: take("root"),
            services: Section::new("services", take("services")),
            commands: Section::new("commands", take("commands")),
            template: take("template"),
            editor: take("editor"),
            path,
        })
    }

    /// Base directory every service subdirectory is joined onto
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `root` is not a scalar.
    pub fn root(&self) -> Result<PathBuf, ConfigError> {
        text_at("root", &self.root).map(PathBuf::from)
    }

    /// Custom wrapper containing a `{COMMAND}` placeholder, if set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `template` is not a scalar.
    pub fn template(&self) -> Result<Option<String>, ConfigError> {
        optional_text_at("template", &self.template)
    }

    /// Shell command used by the `edit` action, if set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `editor` is not a scalar.
    pub fn editor(&self) -> Result<Option<String>, ConfigError> {
        optional_text_at("editor", &self.editor)
    }
}

/// Expands a leading `~` in a user supplied path. Everything else is taken literally.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn validate_required_keys(mapping: &Mapping) -> Result<(), ConfigError> {
    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| !mapping.contains_key(**key))
        .map(|key| (*key).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingKeys(missing))
    }
}
