//! # Extração de Keyphrases
//!
//! O extrator é plugável ([`KeyphraseExtractor`]). O padrão,
//! [`CandidateRanker`], gera frases candidatas com sequências de palavras
//! que não são stopwords e as pontua pela razão grau/frequência das suas
//! palavras (quanto mais uma palavra aparece acompanhada, maior o grau).
//! As pontuações são normalizadas para `(0, 1]`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::VectorizerParams;
use crate::error::Result;
use crate::lang::remove_urls;
use crate::stopwords;
use crate::tokenizer::tokenize;

/// Teto de keyphrases por documento, qualquer que seja o `top_n` pedido.
pub const LIMIT_KEYPHRASES: usize = 100;

/// Lista de stopwords usada quando o vetorizador não define uma.
const DEFAULT_STOP_WORDS: &str = "english";

/// Uma keyphrase e sua pontuação; serializa como par `["frase", 0.87]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase(pub String, pub f32);

impl Keyphrase {
    pub fn phrase(&self) -> &str {
        &self.0
    }

    pub fn score(&self) -> f32 {
        self.1
    }
}

/// Resultado de uma extração: lista única (um documento) ou uma lista por
/// parágrafo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyphraseResult {
    Flat(Vec<Keyphrase>),
    PerParagraph(Vec<Vec<Keyphrase>>),
}

/// Extrator de keyphrases plugável.
pub trait KeyphraseExtractor: Send + Sync {
    /// Até `top_n` keyphrases de `doc`, maior pontuação primeiro.
    fn extract(&self, doc: &str, params: &VectorizerParams, top_n: usize) -> Result<Vec<Keyphrase>>;
}

/// Ranqueador de frases candidatas delimitadas por stopwords.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    max_words: usize,
}

impl CandidateRanker {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words: max_words.max(1),
        }
    }

    /// Frases candidatas (como listas de palavras) na ordem do texto.
    fn candidates(&self, doc: &str, stop: &[&str]) -> Vec<Vec<String>> {
        let cleaned = remove_urls(doc.split_whitespace()).join(" ");
        let mut phrases = Vec::new();
        let mut run: Vec<String> = Vec::new();

        for token in tokenize(&cleaned) {
            let is_stop = stop.contains(&token.text.to_lowercase().as_str());
            if token.is_word() && !is_stop {
                run.push(token.text);
                continue;
            }
            flush_run(&mut run, &mut phrases, self.max_words);
        }
        flush_run(&mut run, &mut phrases, self.max_words);
        phrases
    }
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(3)
    }
}

fn flush_run(run: &mut Vec<String>, phrases: &mut Vec<Vec<String>>, max_words: usize) {
    for chunk in run.chunks(max_words) {
        phrases.push(chunk.to_vec());
    }
    run.clear();
}

impl KeyphraseExtractor for CandidateRanker {
    fn extract(&self, doc: &str, params: &VectorizerParams, top_n: usize) -> Result<Vec<Keyphrase>> {
        let stop = stopwords::by_name(params.stop_words.as_deref().unwrap_or(DEFAULT_STOP_WORDS))
            .unwrap_or(&[]);
        let candidates = self.candidates(doc, stop);

        // Frequência e grau de cada palavra
        let mut freq: HashMap<String, f32> = HashMap::new();
        let mut degree: HashMap<String, f32> = HashMap::new();
        for phrase in &candidates {
            for word in phrase {
                let key = word.to_lowercase();
                *freq.entry(key.clone()).or_insert(0.0) += 1.0;
                *degree.entry(key).or_insert(0.0) += phrase.len() as f32;
            }
        }

        // Pontua cada frase distinta, guardando a primeira ocorrência
        let mut scored: Vec<(String, f32)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for phrase in &candidates {
            let surface = phrase.join(" ");
            let key = surface.to_lowercase();
            if !seen.insert(key.clone()) {
                continue;
            }
            let score: f32 = phrase
                .iter()
                .map(|w| {
                    let w = w.to_lowercase();
                    degree[&w] / freq[&w]
                })
                .sum();
            scored.push((if params.lowercase { key } else { surface }, score));
        }

        let max = scored.iter().map(|(_, s)| *s).fold(0.0_f32, f32::max);
        if max <= 0.0 {
            return Ok(vec![]);
        }

        // sort_by é estável: empates mantêm a ordem do texto
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored
            .into_iter()
            .take(top_n.min(LIMIT_KEYPHRASES))
            .map(|(phrase, score)| Keyphrase(phrase, score / max))
            .collect())
    }
}
