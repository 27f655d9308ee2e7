//! # Tokenizador com Rastreamento de Offsets
//!
//! Divide uma linha de texto em tokens. Cada token guarda a posição exata
//! que ocupa no **texto completo**, não na linha: o tokenizador recebe o
//! [`Offset`] base da linha e o soma a cada match.
//!
//! Cada posição existe em duas unidades. O intervalo em bytes (`start`,
//! `end`) serve para recortar o `&str`; o intervalo em caracteres
//! (`char_start`, `char_end`) é o que as anotações reportam.
//!
//! ## Estratégias
//!
//! - **WordPunctuation** (padrão): regex `\w+|[.,?!]+`. Cada token é uma
//!   sequência máxima de caracteres de palavra ou de pontuação `. , ? !`.
//!   Qualquer outro caractere (espaço, hífen, apóstrofo...) é pulado.
//! - **UnicodeWords**: segmentação por fronteiras de palavra Unicode (UAX #29).
//!
//! Ambas respeitam o mesmo contrato: tokens são substrings contíguas da
//! linha, sem sobreposição, com offsets corretos. Por isso o span finder
//! não precisa saber qual estratégia foi usada.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use standoff_core::tokenizer::{tokenize_line, Offset, TokenizerMode};
//!
//! // Segunda linha de "Olá\nGeorge Clooney!": byte 5, caractere 4
//! let base = Offset { byte: 5, char: 4 };
//! let tokens = tokenize_line("George Clooney!", base, TokenizerMode::WordPunctuation);
//!
//! assert_eq!(tokens[0].text, "George");
//! assert_eq!((tokens[0].start, tokens[0].end), (5, 11));
//! assert_eq!((tokens[0].char_start, tokens[0].char_end), (4, 10));
//! assert_eq!(tokens[2].text, "!");
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Posição no texto completo, em bytes e em caracteres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub byte: usize,
    pub char: usize,
}

impl Offset {
    /// Avança sobre `text`, que começa exatamente nesta posição.
    pub fn advance(self, text: &str) -> Self {
        Self {
            byte: self.byte + text.len(),
            char: self.char + text.chars().count(),
        }
    }
}

/// Um token extraído do texto original.
///
/// O `Token` é imutável depois de criado. Os offsets são absolutos no texto
/// completo, então `&texto[token.start..token.end] == token.text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "George", ",", "?!").
    pub text: String,
    /// Índice de byte inicial no texto completo (inclusive).
    pub start: usize,
    /// Índice de byte final no texto completo (exclusivo). Sempre `start + text.len()`.
    pub end: usize,
    /// Posição em caracteres do início do token (inclusive).
    pub char_start: usize,
    /// Posição em caracteres do fim do token (exclusivo).
    pub char_end: usize,
    /// Posição do token dentro da sua linha (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// Cria um token que começa em `at` no texto completo.
    pub fn new(text: impl Into<String>, at: Offset, index: usize) -> Self {
        let text = text.into();
        let end = at.advance(&text);
        Self {
            text,
            start: at.byte,
            end: end.byte,
            char_start: at.char,
            char_end: end.char,
            index,
        }
    }
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Palavra ou pontuação**: `\w+|[.,?!]+`, uma sentença por linha.
    /// Não trata abreviações nem contrações ("don't" vira "don", "t").
    WordPunctuation,
    /// **Palavras Unicode**: fronteiras de palavra UAX #29. Mantém apenas
    /// segmentos com algum caractere alfanumérico ou formados só por `. , ? !`.
    UnicodeWords,
}

impl Default for TokenizerMode {
    fn default() -> Self {
        TokenizerMode::WordPunctuation
    }
}

impl std::str::FromStr for TokenizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word_punctuation" | "regex" | "custom" => Ok(TokenizerMode::WordPunctuation),
            "unicode_words" | "unicode" => Ok(TokenizerMode::UnicodeWords),
            other => Err(other.to_string()),
        }
    }
}

/// Pontuação que forma tokens próprios.
const PUNCTUATION: &[char] = &['.', ',', '?', '!'];

fn word_or_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+|[.,?!]+").expect("regex de tokenização é válida"))
}

/// Tokeniza um texto inteiro como se fosse uma única linha no início do texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_line(text, Offset::default(), TokenizerMode::default())
}

/// Tokeniza uma linha que começa na posição `base` do texto completo.
pub fn tokenize_line(line: &str, base: Offset, mode: TokenizerMode) -> Vec<Token> {
    let pieces: Vec<(usize, &str)> = match mode {
        TokenizerMode::WordPunctuation => word_or_punctuation()
            .find_iter(line)
            .map(|m| (m.start(), m.as_str()))
            .collect(),
        TokenizerMode::UnicodeWords => line
            .split_word_bound_indices()
            .filter(|(_, segment)| {
                segment.chars().any(char::is_alphanumeric)
                    || segment.chars().all(|c| PUNCTUATION.contains(&c))
            })
            .collect(),
    };

    // Os pedaços vêm em ordem crescente: a contagem de caracteres só avança
    let mut cursor = (0, base);
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, (pos, piece))| {
            let (last, at) = cursor;
            let at = at.advance(&line[last..pos]);
            cursor = (pos, at);
            Token::new(piece, at, i)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_words_and_punctuation() {
        let tokens = tokenize("George Clooney, live.");
        assert_eq!(texts(&tokens), vec!["George", "Clooney", ",", "live", "."]);
        assert_eq!((tokens[1].start, tokens[1].end), (7, 14));
        assert_eq!((tokens[2].start, tokens[2].end), (14, 15));
        assert_eq!(tokens[4].index, 4);
    }

    #[test]
    fn test_punctuation_run_is_one_token() {
        let tokens = tokenize("Really?! Yes...");
        assert_eq!(texts(&tokens), vec!["Really", "?!", "Yes", "..."]);
    }

    #[test]
    fn test_skipped_characters_keep_offsets() {
        let text = "don't - stop; now";
        let tokens = tokenize(text);
        assert_eq!(texts(&tokens), vec!["don", "t", "stop", "now"]);
        for t in &tokens {
            assert_eq!(&text[t.start..t.end], t.text);
        }
    }

    #[test]
    fn test_base_offset_is_added() {
        let base = Offset { byte: 100, char: 90 };
        let tokens = tokenize_line("Los Angeles", base, TokenizerMode::WordPunctuation);
        assert_eq!(tokens[0].start, 100);
        assert_eq!(tokens[1].start, 104);
        assert_eq!(tokens[1].end, 111);
        assert_eq!((tokens[1].char_start, tokens[1].char_end), (94, 101));
        // index é relativo à linha
        assert_eq!(tokens[0].index, 0);
    }

    #[test]
    fn test_whitespace_only_line() {
        assert!(tokenize("   \t  ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = "Visitei São Paulo.";
        let tokens = tokenize(text);
        assert_eq!(texts(&tokens), vec!["Visitei", "São", "Paulo", "."]);
        for t in &tokens {
            assert_eq!(t.end, t.start + t.text.len());
            assert_eq!(&text[t.start..t.end], t.text);
        }
        // "São" ocupa 4 bytes e 3 caracteres
        assert_eq!((tokens[1].start, tokens[1].end), (8, 12));
        assert_eq!((tokens[1].char_start, tokens[1].char_end), (8, 11));
        assert_eq!((tokens[2].start, tokens[2].char_start), (13, 12));
    }

    #[test]
    fn test_char_offsets_match_char_indices() {
        let text = "José e Müller viajaram, ação!";
        for mode in [TokenizerMode::WordPunctuation, TokenizerMode::UnicodeWords] {
            for t in tokenize_line(text, Offset::default(), mode) {
                let chars: String = text
                    .chars()
                    .skip(t.char_start)
                    .take(t.char_end - t.char_start)
                    .collect();
                assert_eq!(chars, t.text);
            }
        }
    }

    #[test]
    fn test_unicode_words_mode() {
        let text = "Mila Kunis, in Los Angeles!";
        let tokens = tokenize_line(text, Offset::default(), TokenizerMode::UnicodeWords);
        assert_eq!(
            texts(&tokens),
            vec!["Mila", "Kunis", ",", "in", "Los", "Angeles", "!"]
        );
        for t in &tokens {
            assert_eq!(&text[t.start..t.end], t.text);
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("unicode".parse::<TokenizerMode>(), Ok(TokenizerMode::UnicodeWords));
        assert_eq!(
            "word_punctuation".parse::<TokenizerMode>(),
            Ok(TokenizerMode::WordPunctuation)
        );
        assert!("bpe".parse::<TokenizerMode>().is_err());
    }
}
