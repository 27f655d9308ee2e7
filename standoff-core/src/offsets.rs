//! # Projeção de Offsets
//!
//! Converte um span de tokens na anotação standoff `(tipo, início, fim)`.
//! Só o primeiro e o último membro importam: o intervalo vai do início do
//! primeiro token ao fim do último, incluindo o que houver entre eles
//! (espaços, pontuação pulada).
//!
//! `begin` e `end` são posições em **caracteres** no texto completo. Em
//! texto ASCII coincidem com bytes; "José" já desloca em um tudo o que vem
//! depois. Para recortar o `&str`, use [`OffsetTriple::slice`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::TokenSpan;
use crate::tokenizer::Token;

/// Tipo da entidade e intervalo de caracteres `[begin, end)` no texto original.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetTriple {
    #[serde(rename = "type")]
    pub kind: String,
    pub begin: usize,
    pub end: usize,
}

impl OffsetTriple {
    pub fn new(kind: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            kind: kind.into(),
            begin,
            end,
        }
    }

    /// Trecho do texto coberto pela anotação, se o intervalo for válido para `text`.
    pub fn slice<'t>(&self, text: &'t str) -> Option<&'t str> {
        if self.begin > self.end {
            return None;
        }
        let begin = byte_position(text, self.begin)?;
        let end = begin + byte_position(&text[begin..], self.end - self.begin)?;
        Some(&text[begin..end])
    }
}

impl fmt::Display for OffsetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.kind, self.begin, self.end)
    }
}

/// Byte onde começa o caractere de posição `n`; `n == chars` é o fim do texto.
fn byte_position(text: &str, n: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(n)
}

/// Projeta um span nos offsets (em caracteres) do primeiro e do último token.
///
/// Spans emitidos pelo [`SpanFinder`](crate::span::SpanFinder) nunca são
/// vazios, então o resultado é sempre `Some` para eles.
pub fn project(span: &TokenSpan<Token>) -> Option<OffsetTriple> {
    let first = span.first()?;
    let last = span.last()?;
    Some(OffsetTriple::new(span.kind(), first.char_start, last.char_end))
}

/// Uma anotação pronta para exibição: o triplo e o texto que ele cobre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(flatten)]
    pub triple: OffsetTriple,
    pub text: String,
}

impl Annotation {
    /// Recorta o texto coberto por `triple`. Intervalos fora do texto geram texto vazio.
    pub fn from_triple(triple: OffsetTriple, source: &str) -> Self {
        let text = triple.slice(source).unwrap_or_default().to_string();
        Self { triple, text }
    }
}

impl fmt::Display for Annotation {
    /// Formato `(PERSON,0,14) George Clooney`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.triple, self.text)
    }
}
