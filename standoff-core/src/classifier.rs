//! # Fronteira do Classificador
//!
//! O pipeline não decide o label de nenhum token. Ele pede isso a um
//! [`Classifier`]: recebe os tokens de uma linha e devolve um label por
//! token, na mesma ordem. Labels são strings opacas, comparadas apenas por
//! igualdade e pertinência ao conjunto observado.
//!
//! Qualquer closure `Fn(&[Token]) -> Vec<String>` já é um classificador, o
//! que facilita testes com labels determinísticos. Para uso sem modelo
//! treinado há o [`GazetteerClassifier`], baseado em listas de entidades
//! conhecidas e numa regra de títulos.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tokenizer::Token;

/// Label "fora de entidade" usado pelos classificadores deste crate.
pub const OUTSIDE: &str = "O";

/// Um token com o label que o classificador atribuiu a ele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledToken {
    pub token: Token,
    pub label: String,
}

/// Atribui um label a cada token de uma sentença.
///
/// Contrato: o vetor devolvido tem exatamente `tokens.len()` elementos, na
/// mesma ordem. Quebrar o contrato aborta a linha com
/// [`StandoffError::LabelCountMismatch`](crate::error::StandoffError::LabelCountMismatch).
pub trait Classifier {
    fn classify(&self, tokens: &[Token]) -> Vec<String>;
}

impl<F> Classifier for F
where
    F: Fn(&[Token]) -> Vec<String>,
{
    fn classify(&self, tokens: &[Token]) -> Vec<String> {
        self(tokens)
    }
}

/// Classificador por dicionário (gazetteers) e padrões simples.
///
/// 1. Entradas de um ou mais tokens, sem diferenciar maiúsculas; a entrada
///    mais longa vence quando várias casam na mesma posição.
/// 2. Regra de título: "Dr", "President", "Mr"... seguido de palavras
///    capitalizadas ainda sem label → `PERSON`.
///
/// Todo o resto recebe [`OUTSIDE`].
#[derive(Debug, Clone)]
pub struct GazetteerClassifier {
    /// (partes em lowercase, label), ordenado da entrada mais longa para a mais curta
    entries: Vec<(Vec<String>, String)>,
    /// Títulos que precedem nomes de pessoas (lowercase)
    person_titles: Vec<String>,
}

impl GazetteerClassifier {
    pub fn new() -> Self {
        Self {
            entries: vec![],
            person_titles: [
                "mr", "mrs", "ms", "miss", "dr", "prof", "sir", "president", "senator",
                "governor", "mayor", "general", "captain", "minister", "judge", "king",
                "queen", "pope",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Cria um classificador com as entradas padrão de [`corpus::default_gazetteer`](crate::corpus::default_gazetteer).
    pub fn with_defaults() -> Self {
        let mut classifier = Self::new();
        for (label, names) in crate::corpus::default_gazetteer() {
            for name in names {
                classifier.add(label, name);
            }
        }
        classifier
    }

    /// Adiciona uma entrada (pode ter várias palavras, ex: "Los Angeles").
    pub fn add(&mut self, label: &str, name: &str) {
        let parts: Vec<String> = name.split_whitespace().map(|p| p.to_lowercase()).collect();
        if parts.is_empty() {
            return;
        }
        // Mantém a ordem por tamanho decrescente; estável para entradas de mesmo tamanho
        let pos = self
            .entries
            .iter()
            .position(|(existing, _)| existing.len() < parts.len())
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, (parts, label.to_string()));
    }

    /// Lê entradas de um JSON no formato `{"PERSON": ["George Clooney", ...], ...}`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let lists: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut classifier = Self::new();
        for (label, names) in &lists {
            for name in names {
                classifier.add(label, name);
            }
        }
        Ok(classifier)
    }

    /// Carrega um gazetteer JSON do disco.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tamanho da entrada que casa a partir de `i`, e seu label.
    fn match_at<'a>(&'a self, tokens: &[Token], i: usize) -> Option<(usize, &'a str)> {
        self.entries.iter().find_map(|(parts, label)| {
            let fits = i + parts.len() <= tokens.len();
            let matches = fits
                && parts
                    .iter()
                    .enumerate()
                    .all(|(j, part)| tokens[i + j].text.to_lowercase() == *part);
            matches.then_some((parts.len(), label.as_str()))
        })
    }

    fn apply_titles(&self, tokens: &[Token], labels: &mut [String]) {
        for i in 0..tokens.len() {
            if !self.person_titles.contains(&tokens[i].text.to_lowercase()) {
                continue;
            }
            // "Dr. Smith": pula o ponto da abreviação
            let mut j = i + 1;
            if tokens.get(j).is_some_and(|t| t.text == ".") {
                j += 1;
            }
            while j < tokens.len() && labels[j] == OUTSIDE && starts_uppercase(&tokens[j].text) {
                labels[j] = "PERSON".to_string();
                j += 1;
            }
        }
    }
}

impl Default for GazetteerClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for GazetteerClassifier {
    fn classify(&self, tokens: &[Token]) -> Vec<String> {
        let mut labels = vec![OUTSIDE.to_string(); tokens.len()];

        let mut i = 0;
        while i < tokens.len() {
            match self.match_at(tokens, i) {
                Some((len, label)) => {
                    for slot in &mut labels[i..i + len] {
                        *slot = label.to_string();
                    }
                    i += len;
                }
                None => i += 1,
            }
        }

        self.apply_titles(tokens, &mut labels);
        labels
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}
