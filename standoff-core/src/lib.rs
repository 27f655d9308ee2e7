//! # standoff-core — Anotação Standoff de Entidades Nomeadas
//!
//! Este crate localiza menções de entidades em texto livre e devolve cada
//! uma como um triplo `(tipo, início, fim)` apontando para o texto original,
//! sem alterá-lo (anotação *standoff*).
//!
//! O label de cada token vem de um classificador externo, tratado como
//! caixa-preta. O trabalho do crate é o que acontece em volta dele.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em linha reta, uma linha (sentença) de cada vez:
//!
//! 1.  **Linhas** ([`pipeline::split_lines`]): o texto é dividido em linhas, preservando o offset de cada uma.
//! 2.  **Tokenização** ([`tokenizer`]): cada linha vira tokens com offsets absolutos (bytes e caracteres).
//! 3.  **Classificação** ([`classifier`]): um [`Classifier`] atribui um label a cada token.
//! 4.  **Spans** ([`span`]): tokens contíguos com o mesmo label observado são agrupados.
//! 5.  **Offsets** ([`offsets`]): cada span vira um [`OffsetTriple`] em posições de caractere.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use standoff_core::{GazetteerRecognizer, OffsetTriple};
//!
//! // Gazetteer embutido, labels PERSON / LOCATION / ORGANIZATION
//! let recognizer = GazetteerRecognizer::default();
//!
//! let text = "George Clooney and Mila Kunis live in Los Angeles.";
//! let triples = recognizer.extract(text).unwrap();
//!
//! assert_eq!(triples[0], OffsetTriple::new("PERSON", 0, 14));
//! assert_eq!(triples[2].slice(text), Some("Los Angeles"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador por linha (sequencial, paralelo e com eventos).
//! - [`span`]: máquina de estados que agrupa tokens em spans.
//! - [`tokenizer`]: segmentação com rastreamento de offsets.
//! - [`classifier`]: fronteira do classificador e o classificador por gazetteer.
//! - [`config`]: configuração via TOML e variáveis de ambiente.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod offsets;
pub mod pipeline;
pub mod span;
pub mod tokenizer;

pub use classifier::{Classifier, GazetteerClassifier, LabeledToken, OUTSIDE};
pub use config::RecognizerConfig;
pub use error::{ConfigError, Result, StandoffError};
pub use offsets::{project, Annotation, OffsetTriple};
pub use pipeline::{GazetteerRecognizer, PipelineEvent, StandoffRecognizer};
pub use span::{find_spans, SpanFinder, SpanState, TokenSpan, WatchedTypes};
pub use tokenizer::{Offset, Token, TokenizerMode};
