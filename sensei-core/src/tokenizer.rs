//! # Tokenizador com Offsets em Caracteres
//!
//! Divide o texto em palavras e pontuações usando as fronteiras de palavra
//! do Unicode (UAX #29). Cada token guarda sua posição no texto original em
//! **caracteres** (não bytes), a mesma unidade usada pelos spans de entidade
//! e pelos parágrafos.
//!
//! ```rust
//! use sensei_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("Olá, Brasil!");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["Olá", ",", "Brasil", "!"]);
//! assert_eq!((tokens[2].start, tokens[2].end), (5, 11));
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token.
    pub text: String,
    /// Offset inicial em caracteres (inclusivo).
    pub start: usize,
    /// Offset final em caracteres (exclusivo).
    pub end: usize,
}

impl Token {
    /// Verdadeiro para tokens formados só por letras/dígitos.
    pub fn is_word(&self) -> bool {
        self.text.chars().any(char::is_alphanumeric)
    }
}

/// Tokeniza `text`, descartando os segmentos de espaço em branco.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut char_pos = 0;
    let mut last_byte = 0;

    for (byte_pos, segment) in text.split_word_bound_indices() {
        // Converte o avanço em bytes para caracteres de forma incremental
        char_pos += text[last_byte..byte_pos].chars().count();
        last_byte = byte_pos;

        if segment.trim().is_empty() {
            continue;
        }

        let len = segment.chars().count();
        tokens.push(Token {
            text: segment.to_string(),
            start: char_pos,
            end: char_pos + len,
        });
    }

    tokens
}

/// Fatia `text` pelo intervalo de caracteres `[start, end)`.
///
/// Intervalos fora do texto são recortados (como um slice em Python):
/// `end` além do fim vira o fim, `start >= end` devolve `""`.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map(|(b, _)| b)
            .unwrap_or(text.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end);
    &text[start_byte..end_byte]
}
