use std::time::Duration;
use std::{env, fmt, fs, path};

use emocipher::classifier::openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use emocipher::keys::{DEFAULT_KEY_BITS, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE};
use emocipher::{KeyStore, OpenAiConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keys: Keys,
    pub classifier: Classifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keys {
    /// Relative paths resolve against the working directory
    pub dir: path::PathBuf,
    pub private_key_file: String,
    pub public_key_file: String,
    pub bits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifier {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            dir: path::PathBuf::from("keys"),
            private_key_file: PRIVATE_KEY_FILE.into(),
            public_key_file: PUBLIC_KEY_FILE.into(),
            bits: DEFAULT_KEY_BITS,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            timeout_seconds: 30,
            max_tokens: 300,
            temperature: 0.3,
        }
    }
}

impl Keys {
    pub fn store(&self) -> KeyStore {
        KeyStore::with_paths(self.dir.join(&self.private_key_file), self.dir.join(&self.public_key_file))
            .with_bits(self.bits)
    }
}

impl Classifier {
    /// OpenAI settings for `api_key`, `None` when classification is disabled
    pub fn openai(&self, api_key: &str) -> Option<OpenAiConfig> {
        if !self.enabled {
            return None;
        }
        let mut config = OpenAiConfig::new(api_key);
        config.endpoint = self.endpoint.clone();
        config.model = self.model.clone();
        config.timeout = Duration::from_secs(self.timeout_seconds);
        config.max_tokens = self.max_tokens;
        config.temperature = self.temperature;
        Some(config)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/emocipher/config.toml or
/// $HOME/.config/...)
pub fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("emocipher/config.toml"))
}

/// Resolve the path `from_config` would read
pub fn resolve_path(optional_path: Option<&path::Path>) -> Result<path::PathBuf, ConfigError> {
    match optional_path {
        Some(path) => Ok(normalize_toml_path(path)),
        None => default_config_path(),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Keys")?;
        write_1(f, "Directory", &self.keys.dir.display())?;
        write_1(f, "Private Key", &self.keys.private_key_file)?;
        write_1(f, "Public Key", &self.keys.public_key_file)?;
        write_1(f, "Key Size", &format_args!("{} bits", self.keys.bits))?;
        write_title_1(f, "Classifier")?;
        write_1(f, "Enabled", &self.classifier.enabled)?;
        write_1(f, "Endpoint", &self.classifier.endpoint)?;
        write_1(f, "Model", &self.classifier.model)?;
        write_1(f, "Timeout", &format_args!("{}s", self.classifier.timeout_seconds))?;
        write_1(f, "Max Tokens", &self.classifier.max_tokens)?;
        write_1(f, "Temperature", &self.classifier.temperature)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/emocipher/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path = resolve_path(optional_path.as_ref().map(AsRef::as_ref))?;

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::Read { path: config_path.clone(), source })?;
            toml::from_str(raw_string.as_str())
                .map_err(|source| ConfigError::Parse { path: config_path, source })
        } else {
            tracing::info!("Writing default config to: {}", config_path.display());
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })?;
        }

        fs::write(path, config_str)
            .map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // And reads back identically
        assert_eq!(Config::from_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_extension_is_normalized() {
        let dir = tempdir().unwrap();
        Config::from_config(Some(dir.path().join("settings"))).unwrap();
        assert!(dir.path().join("settings.toml").exists());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[keys]\ndir = \"/var/lib/emocipher\"\n\n[classifier]\nmodel = \"gpt-4o-mini\"\n")
            .unwrap();

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.keys.dir, path::PathBuf::from("/var/lib/emocipher"));
        assert_eq!(config.keys.bits, DEFAULT_KEY_BITS);
        assert_eq!(config.classifier.model, "gpt-4o-mini");
        assert!(config.classifier.enabled);
    }

    #[test]
    fn test_invalid_config_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[keys\nbits = \"many\"").unwrap();

        assert!(matches!(Config::from_config(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_key_store_paths() {
        let keys = Keys { dir: "/tmp/k".into(), bits: 3072, ..Keys::default() };
        let store = keys.store();
        assert_eq!(store.private_key_path(), path::Path::new("/tmp/k/private_key.pem"));
        assert_eq!(store.public_key_path(), path::Path::new("/tmp/k/public_key.pem"));
        assert_eq!(store.bits(), 3072);
    }

    #[test]
    fn test_disabled_classifier_has_no_openai_config() {
        let classifier = Classifier { enabled: false, ..Classifier::default() };
        assert!(classifier.openai("sk-test").is_none());

        let openai = Classifier::default().openai("sk-test").unwrap();
        assert_eq!(openai.timeout, Duration::from_secs(30));
        assert_eq!(openai.api_key, "sk-test");
    }

    #[test]
    fn test_display_lists_sections() {
        let rendered = Config::default().to_string();
        assert!(rendered.contains("Keys"));
        assert!(rendered.contains("Key Size: 2048 bits"));
        assert!(rendered.contains("Model: gpt-3.5-turbo"));
    }
}
