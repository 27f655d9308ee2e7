//! # Erros do Pipeline Standoff
//!
//! O núcleo (tokenizador, span finder, projetor de offsets) é total: não
//! existe falha recuperável ali dentro. Os erros abaixo vêm sempre das
//! bordas: um classificador que quebra o contrato de alinhamento, ou um
//! arquivo de configuração/gazetteer inválido.

use std::path::PathBuf;

use thiserror::Error;

/// Erros produzidos pelo reconhecedor.
#[derive(Error, Debug)]
pub enum StandoffError {
    /// O classificador devolveu um número de labels diferente do número de tokens.
    ///
    /// É uma violação de contrato do colaborador; a linha é abortada e o erro propagado.
    #[error("classifier returned {labels} labels for {tokens} tokens on line {line}")]
    LabelCountMismatch {
        line: usize,
        tokens: usize,
        labels: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Erros de carregamento de configuração e de gazetteers.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, StandoffError>;
