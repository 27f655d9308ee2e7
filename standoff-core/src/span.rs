//! # Span Finder — Agrupamento de Tokens Contíguos
//!
//! Recebe um fluxo de pares `(token, label)` e agrupa em [`TokenSpan`]s as
//! sequências contíguas de tokens com o **mesmo** label, desde que esse
//! label esteja no conjunto observado ([`WatchedTypes`]). Qualquer outro
//! label é tratado como "fora".
//!
//! ## Máquina de Estados
//!
//! ```text
//!            label observado                 mesmo label
//!   Idle ─────────────────────▶ Building ◀────────────────┐
//!    ▲                           │   │                    │
//!    │    label não observado    │   └────────────────────┘
//!    └───────────────────────────┘   label observado diferente:
//!         (emite o span)             emite o span e começa outro
//!                                    com o token atual
//! ```
//!
//! O token que provoca a troca entre dois tipos observados pertence só ao
//! **novo** span. Nenhum token é descartado nem duplicado.
//!
//! O estado é um valor explícito ([`SpanState`]) com um redutor puro;
//! [`SpanFinder`] apenas guarda esse valor entre chamadas. O pipeline cria
//! um finder novo por linha, então nenhum span atravessa linhas.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use standoff_core::span::{find_spans, TokenSpan, WatchedTypes};
//!
//! let watched = WatchedTypes::new(["PERSON", "LOCATION"]);
//! let pairs = [("Mila", "PERSON"), ("Kunis", "PERSON"), ("in", "O"), ("Rio", "LOCATION")];
//!
//! let spans = find_spans(pairs, &watched);
//! assert_eq!(spans[0], TokenSpan::from_members("PERSON", vec!["Mila", "Kunis"]));
//! assert_eq!(spans[1].to_string(), "LOCATION [Rio]");
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Conjunto imutável de labels para os quais o finder constrói spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedTypes {
    types: HashSet<String>,
}

impl WatchedTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.types.contains(label)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Labels em ordem alfabética (o `HashSet` interno não tem ordem estável).
    pub fn sorted(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for WatchedTypes {
    /// As três classes do modelo de NER de 3 classes.
    fn default() -> Self {
        Self::new(["PERSON", "LOCATION", "ORGANIZATION"])
    }
}

/// Uma sequência de tokens com um tipo associado.
///
/// Dois spans são iguais se têm o mesmo tipo e a mesma sequência de tokens
/// (comparação por conteúdo).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan<T> {
    #[serde(rename = "type")]
    kind: String,
    members: Vec<T>,
}

impl<T> TokenSpan<T> {
    /// Span de um único token. É a única forma usada pelo finder, o que
    /// garante que todo span emitido tem pelo menos um membro.
    pub fn new(kind: impl Into<String>, first: T) -> Self {
        Self {
            kind: kind.into(),
            members: vec![first],
        }
    }

    pub fn from_members(kind: impl Into<String>, members: Vec<T>) -> Self {
        Self {
            kind: kind.into(),
            members,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn into_members(self) -> Vec<T> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.members.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.members.last()
    }

    fn push(&mut self, token: T) {
        self.members.push(token);
    }
}

impl<T: fmt::Display> fmt::Display for TokenSpan<T> {
    /// Formato `TIPO [a, b]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.kind)?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, "]")
    }
}

/// Estado explícito do finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanState<T> {
    /// Nenhum span em construção.
    Idle,
    /// Um span do tipo `span.kind()` acumulando membros.
    Building(TokenSpan<T>),
}

impl<T> Default for SpanState<T> {
    fn default() -> Self {
        SpanState::Idle
    }
}

impl<T> SpanState<T> {
    /// Redutor puro: consome o estado atual e um par `(token, label)`,
    /// devolve o próximo estado e, se houver, o span finalizado.
    pub fn step(
        self,
        token: T,
        label: &str,
        watched: &WatchedTypes,
    ) -> (SpanState<T>, Option<TokenSpan<T>>) {
        if !watched.contains(label) {
            return (SpanState::Idle, self.finish());
        }
        match self {
            SpanState::Idle => (SpanState::Building(TokenSpan::new(label, token)), None),
            SpanState::Building(mut span) if span.kind == label => {
                span.push(token);
                (SpanState::Building(span), None)
            }
            SpanState::Building(span) => (
                SpanState::Building(TokenSpan::new(label, token)),
                Some(span),
            ),
        }
    }

    /// Finaliza o span em construção, se existir.
    pub fn finish(self) -> Option<TokenSpan<T>> {
        match self {
            SpanState::Idle => None,
            SpanState::Building(span) => Some(span),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SpanState::Idle)
    }
}

/// Encontra sequências de tokens contíguos do mesmo tipo num fluxo de pares
/// `(token, label)`.
///
/// Chame [`next_token`](SpanFinder::next_token) para cada par e
/// [`complete`](SpanFinder::complete) quando a entrada acabar; sem essa
/// última chamada, um span no fim da linha nunca seria emitido.
#[derive(Debug)]
pub struct SpanFinder<'w, T> {
    watched: &'w WatchedTypes,
    state: SpanState<T>,
}

impl<'w, T> SpanFinder<'w, T> {
    pub fn new(watched: &'w WatchedTypes) -> Self {
        Self {
            watched,
            state: SpanState::Idle,
        }
    }

    /// Processa o próximo token; devolve um span completo ou `None`.
    pub fn next_token(&mut self, token: T, label: &str) -> Option<TokenSpan<T>> {
        let (next, emitted) = std::mem::take(&mut self.state).step(token, label, self.watched);
        self.state = next;
        emitted
    }

    /// Encerra a entrada atual; devolve o span pendente ou `None`.
    pub fn complete(&mut self) -> Option<TokenSpan<T>> {
        std::mem::take(&mut self.state).finish()
    }

    pub fn state(&self) -> &SpanState<T> {
        &self.state
    }
}

/// Executa um finder novo sobre todos os pares e devolve os spans em ordem
/// de emissão, incluindo o span pendente no fim.
pub fn find_spans<T, L, I>(pairs: I, watched: &WatchedTypes) -> Vec<TokenSpan<T>>
where
    I: IntoIterator<Item = (T, L)>,
    L: AsRef<str>,
{
    let mut finder = SpanFinder::new(watched);
    let mut spans: Vec<TokenSpan<T>> = pairs
        .into_iter()
        .filter_map(|(token, label)| finder.next_token(token, label.as_ref()))
        .collect();
    spans.extend(finder.complete());
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Converte "George/PERSON Clooney/PERSON and/OTHER" em pares.
    fn tagged(sentence: &str) -> Vec<(&str, &str)> {
        sentence
            .split_whitespace()
            .map(|t| t.split_once('/').expect("token/LABEL"))
            .collect()
    }

    fn person_location() -> WatchedTypes {
        WatchedTypes::new(["PERSON", "LOCATION"])
    }

    #[test]
    fn test_span_display() {
        let none: TokenSpan<&str> = TokenSpan::from_members("ORGANIZATION", vec![]);
        assert_eq!(none.to_string(), "ORGANIZATION []");
        assert_eq!(TokenSpan::new("PERSON", "George").to_string(), "PERSON [George]");
        assert_eq!(
            TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"]).to_string(),
            "LOCATION [Los, Angeles]"
        );
    }

    #[test]
    fn test_span_equality() {
        let two = TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"]);
        assert_eq!(two, TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"]));
        assert_ne!(two, TokenSpan::from_members("LOCATION", vec!["Los", "Lobos"]));
        assert_ne!(TokenSpan::new("PERSON", "George"), TokenSpan::new("PERSON", "Mila"));
        assert_ne!(
            TokenSpan::<&str>::from_members("ORGANIZATION", vec![]),
            TokenSpan::from_members("PERSON", vec![])
        );
    }

    #[test]
    fn test_name_and_location() {
        let sentence = "George/PERSON Clooney/PERSON and/OTHER Mila/PERSON Kunis/PERSON \
                        live/OTHER in/OTHER Los/LOCATION Angeles/LOCATION";
        let spans = find_spans(tagged(sentence), &person_location());
        assert_eq!(
            spans,
            vec![
                TokenSpan::from_members("PERSON", vec!["George", "Clooney"]),
                TokenSpan::from_members("PERSON", vec!["Mila", "Kunis"]),
                TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"]),
            ]
        );
    }

    #[test]
    fn test_trailing_span_needs_complete() {
        let watched = person_location();
        let mut finder = SpanFinder::new(&watched);
        assert_eq!(finder.next_token("in", "O"), None);
        assert_eq!(finder.next_token("Los", "LOCATION"), None);
        assert_eq!(finder.next_token("Angeles", "LOCATION"), None);
        assert_eq!(
            finder.complete(),
            Some(TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"]))
        );
    }

    #[test]
    fn test_type_change_starts_new_span() {
        let spans = find_spans(
            tagged("Paris/LOCATION Hilton/PERSON Smith/PERSON"),
            &person_location(),
        );
        assert_eq!(
            spans,
            vec![
                TokenSpan::new("LOCATION", "Paris"),
                TokenSpan::from_members("PERSON", vec!["Hilton", "Smith"]),
            ]
        );
    }

    #[test]
    fn test_type_change_returns_old_span_immediately() {
        let watched = person_location();
        let mut finder = SpanFinder::new(&watched);
        assert_eq!(finder.next_token("Paris", "LOCATION"), None);
        assert_eq!(
            finder.next_token("Hilton", "PERSON"),
            Some(TokenSpan::new("LOCATION", "Paris"))
        );
        assert_eq!(
            finder.state(),
            &SpanState::Building(TokenSpan::new("PERSON", "Hilton"))
        );
    }

    #[test]
    fn test_outside_token_splits_equal_labels() {
        let spans = find_spans(tagged("Mila/PERSON and/O George/PERSON"), &person_location());
        assert_eq!(
            spans,
            vec![TokenSpan::new("PERSON", "Mila"), TokenSpan::new("PERSON", "George")]
        );
    }

    #[test]
    fn test_unwatched_label_is_outside() {
        let spans = find_spans(
            tagged("Acme/ORGANIZATION Corp/ORGANIZATION hired/O Ann/PERSON"),
            &person_location(),
        );
        assert_eq!(spans, vec![TokenSpan::new("PERSON", "Ann")]);
    }

    #[test]
    fn test_complete_when_idle() {
        let watched = person_location();
        let mut finder: SpanFinder<&str> = SpanFinder::new(&watched);
        assert_eq!(finder.complete(), None);

        finder.next_token("Rio", "LOCATION");
        assert!(finder.complete().is_some());
        assert_eq!(finder.complete(), None);
        assert!(finder.state().is_idle());
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let pairs: Vec<(&str, &str)> = vec![];
        assert!(find_spans(pairs, &person_location()).is_empty());
    }

    #[test]
    fn test_reducer_is_pure() {
        let watched = person_location();
        let state = SpanState::Idle;
        let (state, out) = state.step("Los", "LOCATION", &watched);
        assert_eq!(out, None);
        let (state, out) = state.step("Angeles", "LOCATION", &watched);
        assert_eq!(out, None);
        let (state, out) = state.step("!", "O", &watched);
        assert_eq!(out, Some(TokenSpan::from_members("LOCATION", vec!["Los", "Angeles"])));
        assert!(state.is_idle());
        assert_eq!(state.finish(), None);
    }

    #[test]
    fn test_no_token_lost_or_duplicated() {
        let watched = person_location();
        let streams = [
            "a/PERSON b/PERSON c/LOCATION d/O e/LOCATION f/LOCATION",
            "a/O b/O c/O",
            "a/PERSON b/LOCATION c/PERSON d/LOCATION",
            "a/PERSON b/X c/PERSON d/PERSON e/X",
            "a/LOCATION",
        ];
        for stream in streams {
            let pairs = tagged(stream);
            let expected: Vec<&str> = pairs
                .iter()
                .filter(|(_, label)| watched.contains(label))
                .map(|(token, _)| *token)
                .collect();

            let spans = find_spans(pairs.clone(), &watched);
            let flattened: Vec<&str> = spans
                .iter()
                .flat_map(|s| s.members().iter().copied())
                .collect();
            assert_eq!(flattened, expected, "stream: {stream}");

            for span in &spans {
                assert!(!span.is_empty());
                assert!(watched.contains(span.kind()));
                for member in span.members() {
                    let label = pairs.iter().find(|(t, _)| t == member).map(|(_, l)| *l);
                    assert_eq!(label, Some(span.kind()));
                }
            }
        }
    }

    #[test]
    fn test_default_watched_types() {
        let watched = WatchedTypes::default();
        assert_eq!(watched.sorted(), vec!["LOCATION", "ORGANIZATION", "PERSON"]);
        assert!(!watched.contains("O"));
    }
}
