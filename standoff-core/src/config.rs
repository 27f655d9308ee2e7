//! # Configuração do Reconhecedor
//!
//! Lida com arquivo TOML e variáveis de ambiente, com padrões que funcionam
//! sem nenhuma configuração. O ambiente tem precedência sobre o arquivo.
//!
//! | Variável                 | Campo                        |
//! |--------------------------|------------------------------|
//! | `STANDOFF_WATCHED_TYPES` | `watched_types` (vírgulas)   |
//! | `STANDOFF_TOKENIZER`     | `tokenizer_mode`             |
//! | `STANDOFF_GAZETTEER`     | `gazetteer_path`             |
//! | `STANDOFF_HOST`          | `server.host`                |
//! | `STANDOFF_PORT`          | `server.port`                |
//!
//! ```toml
//! watched_types = ["PERSON", "LOCATION"]
//! tokenizer_mode = "unicode_words"
//!
//! [server]
//! port = 8080
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::GazetteerClassifier;
use crate::error::ConfigError;
use crate::span::WatchedTypes;
use crate::tokenizer::TokenizerMode;

/// Configuração completa: reconhecedor + servidor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Labels agrupados em spans; todos os outros são "fora".
    pub watched_types: Vec<String>,

    /// Estratégia de tokenização
    pub tokenizer_mode: TokenizerMode,

    /// Gazetteer JSON opcional; sem ele são usadas as entradas embutidas
    pub gazetteer_path: Option<PathBuf>,

    pub server: ServerConfig,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            watched_types: WatchedTypes::default()
                .sorted()
                .into_iter()
                .map(String::from)
                .collect(),
            tokenizer_mode: TokenizerMode::default(),
            gazetteer_path: None,
            server: ServerConfig::default(),
        }
    }
}

impl RecognizerConfig {
    /// Carrega a configuração apenas das variáveis de ambiente.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Carrega de um arquivo TOML.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileRead {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })
    }

    /// Aplica as variáveis de ambiente por cima desta configuração.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Aplica valores vindos de `lookup` (normalmente `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(types) = lookup("STANDOFF_WATCHED_TYPES") {
            let parsed: Vec<String> = types
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if parsed.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "STANDOFF_WATCHED_TYPES".to_string(),
                    value: types,
                });
            }
            self.watched_types = parsed;
        }
        if let Some(mode) = lookup("STANDOFF_TOKENIZER") {
            self.tokenizer_mode = mode.parse().map_err(|_| ConfigError::InvalidValue {
                key: "STANDOFF_TOKENIZER".to_string(),
                value: mode.clone(),
            })?;
        }
        if let Some(path) = lookup("STANDOFF_GAZETTEER") {
            self.gazetteer_path = Some(PathBuf::from(path));
        }
        if let Some(host) = lookup("STANDOFF_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("STANDOFF_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "STANDOFF_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    pub fn watched(&self) -> WatchedTypes {
        WatchedTypes::new(self.watched_types.iter().cloned())
    }

    /// Gazetteer do arquivo configurado, ou o embutido.
    pub fn classifier(&self) -> Result<GazetteerClassifier, ConfigError> {
        match &self.gazetteer_path {
            Some(path) => GazetteerClassifier::load(path),
            None => Ok(GazetteerClassifier::with_defaults()),
        }
    }
}

/// Configuração do servidor HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RecognizerConfig::default();
        assert_eq!(config.watched(), WatchedTypes::default());
        assert_eq!(config.tokenizer_mode, TokenizerMode::WordPunctuation);
        assert_eq!(config.server.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_env_override() {
        let mut config = RecognizerConfig::default();
        config
            .apply_env(env(&[
                ("STANDOFF_WATCHED_TYPES", "PERSON, LOCATION"),
                ("STANDOFF_TOKENIZER", "unicode_words"),
                ("STANDOFF_PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.watched(), WatchedTypes::new(["PERSON", "LOCATION"]));
        assert_eq!(config.tokenizer_mode, TokenizerMode::UnicodeWords);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_env_invalid_values() {
        let mut config = RecognizerConfig::default();
        let err = config.apply_env(env(&[("STANDOFF_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "STANDOFF_PORT"));

        let err = config
            .apply_env(env(&[("STANDOFF_WATCHED_TYPES", " , ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_toml() {
        let config: RecognizerConfig = toml::from_str(
            r#"
            watched_types = ["ORGANIZATION"]
            tokenizer_mode = "unicode_words"

            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.watched_types, vec!["ORGANIZATION"]);
        assert_eq!(config.tokenizer_mode, TokenizerMode::UnicodeWords);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.gazetteer_path.is_none());
    }

    #[test]
    fn test_missing_file() {
        let err = RecognizerConfig::from_file("/nonexistent/standoff.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
