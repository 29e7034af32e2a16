//! # Segmentação em Parágrafos
//!
//! Divide o texto bruto em parágrafos contíguos, preservando offsets exatos
//! (em caracteres) sobre o texto original. Linhas vazias ou só com espaços
//! não geram parágrafo, mas o cursor avança sobre elas, de modo que os
//! parágrafos seguintes continuam apontando para a posição certa.
//!
//! ## Exemplo
//!
//! ```rust
//! use sensei_core::paragraph::segment;
//!
//! let pars = segment("a\n\nb");
//! assert_eq!(pars.len(), 2);
//! assert_eq!((pars[1].start_char, pars[1].end_char), (3, 4));
//! ```
//!
//! Atenção: se as sentenças do texto contêm `\n` internos, isso deve ser
//! tratado antes (a divisão em sentenças depende do idioma).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NlpError, Result};

/// Um parágrafo do texto original.
///
/// Invariante: `text == source[start_char..end_char]` (em caracteres).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Texto do parágrafo, incluindo o `\n` final quando existe.
    pub text: String,
    /// Offset inicial em caracteres (inclusivo).
    pub start_char: usize,
    /// Offset final em caracteres (exclusivo).
    pub end_char: usize,
}

/// Iterador sobre os parágrafos de um texto.
///
/// Função pura da entrada: chamar [`paragraphs`] de novo recomeça do zero.
pub struct Paragraphs<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    cursor: usize,
}

impl<'a> Iterator for Paragraphs<'a> {
    type Item = Paragraph;

    fn next(&mut self) -> Option<Paragraph> {
        for line in self.lines.by_ref() {
            let start_char = self.cursor;
            self.cursor += line.chars().count();

            // Linha em branco: só avança o cursor
            if line.trim().is_empty() {
                continue;
            }

            return Some(Paragraph {
                text: line.to_string(),
                start_char,
                end_char: self.cursor,
            });
        }
        None
    }
}

/// Itera sobre os parágrafos de `text`, separados por `\n`.
///
/// Cada parágrafo vai até o próximo `\n` (incluído) ou até o fim do texto.
pub fn paragraphs(text: &str) -> Paragraphs<'_> {
    Paragraphs {
        lines: text.split_inclusive('\n'),
        cursor: 0,
    }
}

/// Versão materializada de [`paragraphs`].
pub fn segment(text: &str) -> Vec<Paragraph> {
    paragraphs(text).collect()
}

/// Formato de entrada aceito pelos helpers de limpeza: texto bruto ou
/// lista de parágrafos já separados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    Text(String),
    Paragraphs(Vec<String>),
}

impl TextInput {
    /// Quantidade total de caracteres da entrada.
    pub fn char_len(&self) -> usize {
        match self {
            TextInput::Text(t) => t.chars().count(),
            TextInput::Paragraphs(ps) => ps.iter().map(|p| p.chars().count()).sum(),
        }
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Text(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Text(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(pars: Vec<String>) -> Self {
        TextInput::Paragraphs(pars)
    }
}

impl TryFrom<&Value> for TextInput {
    type Error = NlpError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(TextInput::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(wrong_type(other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(TextInput::Paragraphs),
            other => Err(wrong_type(other)),
        }
    }
}

fn wrong_type(value: &Value) -> NlpError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    NlpError::InvalidInput(format!(
        "parameter `text` is of wrong type: {kind}; only string or list of strings are allowed"
    ))
}

/// Lista uniforme de parágrafos não vazios, sem espaços nas bordas.
///
/// Listas são apenas limpas (sem cálculo de offsets); textos passam por
/// [`paragraphs`] antes.
pub fn to_paragraph_list(input: &TextInput) -> Vec<String> {
    match input {
        TextInput::Paragraphs(pars) => pars
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        TextInput::Text(text) => paragraphs(text)
            .filter_map(|p| {
                let trimmed = p.text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect(),
    }
}

/// Junta os parágrafos limpos com um espaço simples.
pub fn flatten(input: &TextInput) -> String {
    to_paragraph_list(input).join(" ")
}

/// Documentos prontos para os extratores: um por parágrafo, ou um único
/// documento achatado quando `flatten` é verdadeiro.
pub fn clean_text(input: &TextInput, flatten_docs: bool) -> Vec<String> {
    if flatten_docs {
        let joined = flatten(input);
        if joined.is_empty() {
            return vec![];
        }
        return vec![joined];
    }
    to_paragraph_list(input)
}
