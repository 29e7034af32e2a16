//! # Esquema IOB e Compilação de Entidades
//!
//! Modelos de classificação de tokens devolvem uma lista plana de
//! sub-palavras rotuladas no esquema **IOB**. Este módulo remonta essas
//! peças em spans de entidade com texto e intervalo de caracteres.
//!
//! ## Esquema
//!
//! - `B-TAG` (Begin): primeiro token de uma entidade
//! - `I-TAG` (Inside): continuação da entidade aberta
//! - `0` (Outside): não é entidade (`O` também é aceito)
//!
//! ## Máquina de estados
//!
//! | Tag   | Acumulador | Ação                                            |
//! |-------|------------|-------------------------------------------------|
//! | `0`   | aberto     | finaliza e grava; zera                          |
//! | `0`   | vazio      | nada                                            |
//! | `B-X` | aberto     | finaliza e grava; abre novo a partir do token   |
//! | `B-X` | vazio      | abre novo a partir do token                     |
//! | `I-X` | aberto     | junta a palavra; estende `end_char`             |
//! | `I-X` | vazio      | descarta o token (tagging malformado)           |
//!
//! Um acumulador ainda aberto no fim da entrada **não** é gravado por
//! [`compile_entities`]; quem precisa dele chama [`SpanCompiler::finish`].

use serde::{Deserialize, Serialize};

use crate::tokenizer::char_slice;

/// Marcador de sub-palavra (WordPiece usa `##`).
const SUBWORD_MARKER: char = '#';

/// Tag IOB de um token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IobTag {
    /// Início de entidade, com o rótulo (ex: "PER").
    Begin(String),
    /// Continuação da entidade aberta.
    Inside(String),
    /// Fora de entidade.
    Outside,
}

impl IobTag {
    /// Interpreta a tag como string (ex: "B-PER" → `Begin("PER")`).
    ///
    /// Qualquer coisa que não seja `0`/`O` nem comece com `B-` é tratada
    /// como continuação.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "0" | "O" => IobTag::Outside,
            _ if tag.starts_with("B-") => IobTag::Begin(label_of(tag).to_string()),
            _ => IobTag::Inside(label_of(tag).to_string()),
        }
    }
}

/// Texto depois do primeiro `-` da tag.
fn label_of(tag: &str) -> &str {
    tag.split_once('-').map(|(_, label)| label).unwrap_or(tag)
}

/// Um token rotulado, no formato devolvido por pipelines de NER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Palavra ou sub-palavra (ex: "Jo", "##hn").
    pub word: String,
    /// Tag IOB em texto (ex: "B-PER", "I-PER", "0").
    pub entity: String,
    /// Offset inicial em caracteres.
    pub start: usize,
    /// Offset final em caracteres.
    pub end: usize,
    /// Confiança do modelo, quando disponível.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, entity: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            word: word.into(),
            entity: entity.into(),
            start,
            end,
            score: None,
        }
    }

    pub fn tag(&self) -> IobTag {
        IobTag::parse(&self.entity)
    }
}

/// Uma entidade compilada, no formato de span do spaCy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade.
    pub entity: String,
    /// Rótulo (ex: "PER", "ORG").
    pub label: String,
    /// Offset inicial em caracteres (inclusivo).
    pub start_char: usize,
    /// Offset final em caracteres (exclusivo).
    pub end_char: usize,
    /// Nome do modelo que produziu a entidade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl EntitySpan {
    fn open(token: &TaggedToken, label: String) -> Self {
        Self {
            entity: token.word.clone(),
            label,
            start_char: token.start,
            end_char: token.end,
            model: None,
        }
    }

    fn extend(&mut self, token: &TaggedToken) {
        join_word(&mut self.entity, &token.word);
        self.end_char = token.end;
    }
}

/// Junta uma palavra de continuação ao texto acumulado.
///
/// - sub-palavra (`##son`): marcadores removidos, sem espaço;
/// - pontuação isolada: sem espaço;
/// - demais: um espaço antes.
fn join_word(acc: &mut String, word: &str) {
    let word = word.trim();
    if word.starts_with(SUBWORD_MARKER) {
        acc.extend(word.chars().filter(|c| *c != SUBWORD_MARKER));
        return;
    }

    let mut chars = word.chars();
    let is_punct = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_punctuation());
    if is_punct || word.is_empty() {
        acc.push_str(word);
    } else {
        acc.push(' ');
        acc.push_str(word);
    }
}

/// Acumulador de passo único que transforma tokens IOB em spans.
#[derive(Debug, Default)]
pub struct SpanCompiler {
    spans: Vec<EntitySpan>,
    current: Option<EntitySpan>,
}

impl SpanCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processa um token, segundo a tabela do módulo.
    pub fn push(&mut self, token: &TaggedToken) {
        match token.tag() {
            IobTag::Outside => {
                if let Some(span) = self.current.take() {
                    self.spans.push(span);
                }
            }
            IobTag::Begin(label) => {
                if let Some(span) = self.current.replace(EntitySpan::open(token, label)) {
                    self.spans.push(span);
                }
            }
            IobTag::Inside(_) => {
                // I- sem B- anterior: problema de tagging, o token é ignorado
                if let Some(span) = self.current.as_mut() {
                    span.extend(token);
                }
            }
        }
    }

    /// Spans já finalizados, descartando o acumulador aberto.
    pub fn into_spans(self) -> Vec<EntitySpan> {
        self.spans
    }

    /// Spans finalizados mais o acumulador aberto, se houver.
    pub fn finish(mut self) -> Vec<EntitySpan> {
        if let Some(span) = self.current.take() {
            self.spans.push(span);
        }
        self.spans
    }
}

/// Compila tokens IOB em spans de entidade.
///
/// Determinística e preserva a ordem. A entidade ainda aberta no último
/// token não entra no resultado (ver [`SpanCompiler::finish`]).
pub fn compile_entities(tokens: &[TaggedToken]) -> Vec<EntitySpan> {
    let mut compiler = SpanCompiler::new();
    for token in tokens {
        compiler.push(token);
    }
    compiler.into_spans()
}

/// Finaliza um span para o cliente: injeta o nome do modelo (último
/// segmento de `model` separado por `/`) e refaz o texto como fatia exata
/// de `source`.
pub fn prepare_entity(mut span: EntitySpan, source: &str, model: &str) -> EntitySpan {
    let model_name = model.rsplit('/').next().unwrap_or(model);
    span.model = Some(model_name.to_string());
    span.entity = char_slice(source, span.start_char, span.end_char).to_string();
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(word: &str, entity: &str, start: usize, end: usize) -> TaggedToken {
        TaggedToken::new(word, entity, start, end)
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(IobTag::parse("0"), IobTag::Outside);
        assert_eq!(IobTag::parse("O"), IobTag::Outside);
        assert_eq!(IobTag::parse("B-PER"), IobTag::Begin("PER".into()));
        assert_eq!(IobTag::parse("I-LOC"), IobTag::Inside("LOC".into()));
        assert_eq!(IobTag::parse("B-Disease_disorder"), IobTag::Begin("Disease_disorder".into()));
    }

    #[test]
    fn test_single_entity_closed_by_outside() {
        let tokens = vec![tok("John", "B-PER", 0, 4), tok("0", "0", 5, 6)];
        let spans = compile_entities(&tokens);
        assert_eq!(
            spans,
            vec![EntitySpan {
                entity: "John".into(),
                label: "PER".into(),
                start_char: 0,
                end_char: 4,
                model: None,
            }]
        );
    }

    #[test]
    fn test_orphan_continuation_dropped() {
        let tokens = vec![tok("##son", "I-PER", 4, 7)];
        assert!(compile_entities(&tokens).is_empty());
    }

    #[test]
    fn test_subword_joined_without_space() {
        let tokens = vec![
            tok("Gold", "B-ORG", 0, 4),
            tok("##man", "I-ORG", 4, 7),
            tok("Sachs", "I-ORG", 8, 13),
            tok(".", "0", 13, 14),
        ];
        let spans = compile_entities(&tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity, "Goldman Sachs");
        assert_eq!((spans[0].start_char, spans[0].end_char), (0, 13));
    }

    #[test]
    fn test_punctuation_joined_without_space() {
        let tokens = vec![
            tok("AT", "B-ORG", 0, 2),
            tok("&", "I-ORG", 2, 3),
            tok("T", "I-ORG", 3, 4),
            tok("x", "0", 5, 6),
        ];
        assert_eq!(compile_entities(&tokens)[0].entity, "AT& T");
    }

    #[test]
    fn test_begin_closes_previous() {
        let tokens = vec![
            tok("Paris", "B-LOC", 0, 5),
            tok("Hilton", "B-PER", 6, 12),
            tok("0", "0", 12, 13),
        ];
        let spans = compile_entities(&tokens);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].label, "LOC");
        assert_eq!(spans[1].label, "PER");
        assert!(spans[0].end_char <= spans[1].end_char);
    }

    #[test]
    fn test_trailing_entity_not_flushed() {
        let tokens = vec![tok("a", "0", 0, 1), tok("Berlin", "B-LOC", 2, 8)];
        assert!(compile_entities(&tokens).is_empty());

        let mut compiler = SpanCompiler::new();
        tokens.iter().for_each(|t| compiler.push(t));
        let spans = compiler.finish();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity, "Berlin");
    }

    #[test]
    fn test_prepare_entity_slices_source() {
        let source = "Meet Goldman  Sachs today";
        let span = EntitySpan {
            entity: "Goldman Sachs".into(),
            label: "ORG".into(),
            start_char: 5,
            end_char: 19,
            model: None,
        };
        let prepared = prepare_entity(span, source, "/srv/data/biomedical-ner-all");
        assert_eq!(prepared.entity, "Goldman  Sachs");
        assert_eq!(prepared.model.as_deref(), Some("biomedical-ner-all"));
    }

    #[test]
    fn test_prepare_entity_serializes_model() {
        let span = prepare_entity(
            EntitySpan {
                entity: String::new(),
                label: "PER".into(),
                start_char: 0,
                end_char: 4,
                model: None,
            },
            "John",
            "bert-large-NER",
        );
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entity": "John",
                "label": "PER",
                "start_char": 0,
                "end_char": 4,
                "model": "bert-large-NER"
            })
        );
    }
}
