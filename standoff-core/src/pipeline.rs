//! # Pipeline Standoff — Orquestrador por Linha
//!
//! Divide o texto em linhas (uma sentença por linha) e, para cada uma,
//! executa Tokenizador → Classificador → Span Finder → Projeção de Offsets,
//! concatenando os triplos na ordem em que aparecem.
//!
//! Cada linha recebe um [`SpanFinder`] novo: nenhum span atravessa a
//! fronteira entre linhas, mesmo que a última palavra de uma linha e a
//! primeira da seguinte tenham o mesmo label.
//!
//! Assim como no restante do crate, o pipeline pode emitir eventos em cada
//! passo via um canal (`mpsc`), permitindo que o servidor WebSocket
//! transmita o progresso para o cliente.

use std::sync::mpsc;
use std::sync::OnceLock;
use std::time::Instant;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{Classifier, GazetteerClassifier, LabeledToken};
use crate::config::RecognizerConfig;
use crate::error::{ConfigError, Result, StandoffError};
use crate::offsets::{project, Annotation, OffsetTriple};
use crate::span::{SpanFinder, TokenSpan, WatchedTypes};
use crate::tokenizer::{tokenize_line, Offset, Token, TokenizerMode};

/// Uma linha do texto de entrada, sem os caracteres de quebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'t> {
    pub text: &'t str,
    /// Posição do texto completo onde a linha começa.
    pub offset: Offset,
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Zero ou mais caracteres que não são quebra, seguidos de uma ou mais quebras;
    // ou uma última linha sem quebra.
    RE.get_or_init(|| {
        Regex::new(r"([^\r\n]*)[\r\n]+|([^\r\n]+)$").expect("regex de linhas é válida")
    })
}

/// Divide o texto em linhas preservando o offset de cada uma.
///
/// Sequências de quebras (`\r\n`, `\n\n`...) encerram a linha; o conteúdo
/// capturado nunca inclui as quebras.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut position = Offset::default();
    for caps in line_regex().captures_iter(text) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
        else {
            continue;
        };
        position = position.advance(&text[position.byte..whole.start()]);
        lines.push(Line {
            text: content.as_str(),
            offset: position,
        });
    }
    lines
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Uma linha foi tokenizada.
    LineTokenized {
        line: usize,
        /// Caractere do texto completo onde a linha começa.
        offset: usize,
        tokens: Vec<Token>,
    },
    /// O classificador atribuiu um label a um token.
    TokenLabeled {
        line: usize,
        token_index: usize,
        token_text: String,
        label: String,
    },
    /// O span finder emitiu um span e ele foi projetado em offsets.
    SpanCompleted {
        line: usize,
        triple: OffsetTriple,
        tokens: Vec<String>,
    },
    /// Processamento concluído.
    Done {
        triples: Vec<OffsetTriple>,
        total_lines: usize,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// Uma linha foi abortada; nenhum evento segue este.
    Error { message: String },
}

/// Resultado de uma linha: triplos e número de tokens vistos.
struct LineOutput {
    triples: Vec<OffsetTriple>,
    token_count: usize,
}

/// O reconhecedor standoff.
///
/// Guarda o classificador, o conjunto de labels observados e a estratégia
/// de tokenização. Todos os métodos usam `&self`; o estado do span finder
/// vive apenas durante o processamento de cada linha.
pub struct StandoffRecognizer<C> {
    classifier: C,
    watched: WatchedTypes,
    tokenizer_mode: TokenizerMode,
}

impl<C: Classifier> StandoffRecognizer<C> {
    pub fn new(classifier: C, watched: WatchedTypes) -> Self {
        Self {
            classifier,
            watched,
            tokenizer_mode: TokenizerMode::default(),
        }
    }

    pub fn with_tokenizer_mode(mut self, mode: TokenizerMode) -> Self {
        self.tokenizer_mode = mode;
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn watched(&self) -> &WatchedTypes {
        &self.watched
    }

    pub fn tokenizer_mode(&self) -> TokenizerMode {
        self.tokenizer_mode
    }

    /// Extrai os triplos `(tipo, início, fim)` de todo o texto, linha a linha.
    pub fn extract(&self, text: &str) -> Result<Vec<OffsetTriple>> {
        let mut triples = Vec::new();
        for (i, line) in split_lines(text).iter().enumerate() {
            triples.extend(self.process_line(i, line, None)?.triples);
        }
        Ok(triples)
    }

    /// Como [`extract`](Self::extract), mas acompanha cada triplo do texto que ele cobre.
    pub fn annotate(&self, text: &str) -> Result<Vec<Annotation>> {
        Ok(self
            .extract(text)?
            .into_iter()
            .map(|triple| Annotation::from_triple(triple, text))
            .collect())
    }

    /// Processa uma única linha. `index` só é usado em erros e logs.
    pub fn extract_line(&self, index: usize, line: &Line<'_>) -> Result<Vec<OffsetTriple>> {
        Ok(self.process_line(index, line, None)?.triples)
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `LineTokenized` (por linha)
    /// 2. `TokenLabeled` (por token)
    /// 3. `SpanCompleted` (por span, na ordem em que o finder os emite)
    /// 4. `Done` com todos os triplos, ou `Error` se uma linha for abortada
    pub fn extract_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let lines = split_lines(text);
        let mut triples = Vec::new();
        let mut total_tokens = 0;

        for (i, line) in lines.iter().enumerate() {
            match self.process_line(i, line, Some(&tx)) {
                Ok(output) => {
                    triples.extend(output.triples);
                    total_tokens += output.token_count;
                }
                Err(e) => {
                    warn!(line = i, error = %e, "linha abortada");
                    let _ = tx.send(PipelineEvent::Error {
                        message: e.to_string(),
                    });
                    return;
                }
            }
        }

        let _ = tx.send(PipelineEvent::Done {
            triples,
            total_lines: lines.len(),
            total_tokens,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    fn process_line(
        &self,
        index: usize,
        line: &Line<'_>,
        events: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<LineOutput> {
        // === Passo 1: Tokenização ===
        let tokens = tokenize_line(line.text, line.offset, self.tokenizer_mode);
        emit(events, || PipelineEvent::LineTokenized {
            line: index,
            offset: line.offset.char,
            tokens: tokens.clone(),
        });

        // === Passo 2: Classificação ===
        let labels = self.classifier.classify(&tokens);
        if labels.len() != tokens.len() {
            return Err(StandoffError::LabelCountMismatch {
                line: index,
                tokens: tokens.len(),
                labels: labels.len(),
            });
        }
        let token_count = tokens.len();
        let labeled: Vec<LabeledToken> = tokens
            .into_iter()
            .zip(labels)
            .map(|(token, label)| LabeledToken { token, label })
            .collect();

        // === Passo 3: Spans (finder novo a cada linha) ===
        let mut finder = SpanFinder::new(&self.watched);
        let mut triples = Vec::new();
        let mut on_span = |span: TokenSpan<Token>| {
            if let Some(triple) = project(&span) {
                emit(events, || PipelineEvent::SpanCompleted {
                    line: index,
                    triple: triple.clone(),
                    tokens: span.members().iter().map(|t| t.text.clone()).collect(),
                });
                triples.push(triple);
            }
        };

        for LabeledToken { token, label } in labeled {
            emit(events, || PipelineEvent::TokenLabeled {
                line: index,
                token_index: token.index,
                token_text: token.text.clone(),
                label: label.clone(),
            });
            if let Some(span) = finder.next_token(token, &label) {
                on_span(span);
            }
        }
        if let Some(span) = finder.complete() {
            on_span(span);
        }

        debug!(
            line = index,
            offset = line.offset.char,
            tokens = token_count,
            spans = triples.len(),
            "linha processada"
        );
        Ok(LineOutput {
            triples,
            token_count,
        })
    }
}

impl<C: Classifier + Sync> StandoffRecognizer<C> {
    /// Processa as linhas em paralelo (rayon) e remonta os triplos na ordem
    /// original das linhas. O resultado é idêntico ao de [`extract`](Self::extract),
    /// inclusive o erro: com várias linhas inválidas, vale a de menor índice.
    pub fn extract_parallel(&self, text: &str) -> Result<Vec<OffsetTriple>> {
        let per_line: Vec<Result<Vec<OffsetTriple>>> = split_lines(text)
            .par_iter()
            .enumerate()
            .map(|(i, line)| self.extract_line(i, line))
            .collect();

        let mut triples = Vec::new();
        for line in per_line {
            triples.extend(line?);
        }
        Ok(triples)
    }
}

/// Reconhecedor com o classificador por gazetteer, usado pelo servidor.
pub type GazetteerRecognizer = StandoffRecognizer<GazetteerClassifier>;

impl StandoffRecognizer<GazetteerClassifier> {
    /// Monta o reconhecedor a partir da configuração (gazetteer, labels, tokenizador).
    pub fn from_config(config: &RecognizerConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(config.classifier()?, config.watched())
            .with_tokenizer_mode(config.tokenizer_mode))
    }
}

impl Default for StandoffRecognizer<GazetteerClassifier> {
    fn default() -> Self {
        Self::new(GazetteerClassifier::with_defaults(), WatchedTypes::default())
    }
}

fn emit<F>(events: Option<&mpsc::Sender<PipelineEvent>>, event: F)
where
    F: FnOnce() -> PipelineEvent,
{
    if let Some(tx) = events {
        let _ = tx.send(event());
    }
}
