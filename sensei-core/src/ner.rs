//! # Backends de NER
//!
//! A inferência de NER é delegada a um [`TokenClassifier`], que devolve
//! sub-palavras rotuladas em IOB (o mesmo formato de um pipeline de
//! transformers). O [`ClassifierLoader`] constrói o classificador a partir do
//! diretório de modelo resolvido pelo registro.
//!
//! O backend padrão, [`GazetteerTagger`], combina listas de entidades
//! conhecidas (gazetteers) com padrões simples:
//!
//! - títulos antes de nomes ("Dr. Smith" → PER);
//! - sufixos societários depois de nomes ("Acme Inc" → ORG).
//!
//! Palavras longas são quebradas em peças `##` como no WordPiece, então a
//! saída exercita a junção de sub-palavras do compilador de spans.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tagger::TaggedToken;
use crate::tokenizer::{tokenize, Token};

/// Nome do arquivo de gazetteers dentro do diretório do modelo.
pub const GAZETTEER_FILE: &str = "gazetteer.json";

/// Classificador de tokens plugável.
pub trait TokenClassifier: Send + Sync {
    /// Tokens rotulados de `text`, na ordem do texto, com offsets em caracteres.
    fn classify(&self, text: &str) -> Result<Vec<TaggedToken>>;
}

/// Constrói classificadores a partir do diretório de um modelo.
pub trait ClassifierLoader: Send + Sync {
    fn load(&self, model_dir: &Path) -> Result<Arc<dyn TokenClassifier>>;
}

/// Listas de entidades conhecidas, no formato de `gazetteer.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub persons: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
}

/// Rótulo atribuído a um token: categoria e se abre a entidade.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Assigned {
    label: &'static str,
    begin: bool,
    score: f32,
}

/// Tagger por gazetteers e padrões.
#[derive(Debug, Clone)]
pub struct GazetteerTagger {
    /// Entradas como sequência de palavras em minúsculas, maiores primeiro.
    entries: Vec<(Vec<String>, &'static str)>,
    person_titles: Vec<String>,
    org_suffixes: Vec<String>,
    /// Tamanho máximo (em caracteres) de uma peça de palavra.
    max_piece_len: usize,
}

impl GazetteerTagger {
    pub fn new(gazetteer: &Gazetteer) -> Self {
        let mut entries = Vec::new();
        let groups: [(&[String], &'static str); 4] = [
            (&gazetteer.persons, "PER"),
            (&gazetteer.organizations, "ORG"),
            (&gazetteer.locations, "LOC"),
            (&gazetteer.misc, "MISC"),
        ];
        for (names, label) in groups {
            for name in names {
                let words: Vec<String> = tokenize(name).into_iter().map(|t| t.text.to_lowercase()).collect();
                if !words.is_empty() {
                    entries.push((words, label));
                }
            }
        }
        // Casamento guloso: entradas mais longas ganham
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            entries,
            person_titles: [
                "mr", "mrs", "ms", "dr", "prof", "sir", "president", "senator", "minister",
                "judge", "ceo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            org_suffixes: ["inc", "corp", "ltd", "llc", "plc", "gmbh", "ag", "co"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_piece_len: 8,
        }
    }

    /// Lê `gazetteer.json` de `model_dir`; sem o arquivo, usa só os padrões.
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let path = model_dir.join(GAZETTEER_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "sem gazetteer, usando apenas padrões");
            return Ok(Self::new(&Gazetteer::default()));
        }
        let gazetteer: Gazetteer = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(Self::new(&gazetteer))
    }

    pub fn with_max_piece_len(mut self, len: usize) -> Self {
        self.max_piece_len = len.max(1);
        self
    }

    fn assign(&self, tokens: &[Token]) -> Vec<Option<Assigned>> {
        let lower: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();
        let mut result: Vec<Option<Assigned>> = vec![None; tokens.len()];

        // 1. Gazetteers (n-gramas)
        let mut i = 0;
        'outer: while i < tokens.len() {
            for (words, label) in &self.entries {
                let end = i + words.len();
                if end <= tokens.len() && lower[i..end] == words[..] {
                    for (j, slot) in result[i..end].iter_mut().enumerate() {
                        *slot = Some(Assigned {
                            label: *label,
                            begin: j == 0,
                            score: 0.92,
                        });
                    }
                    i = end;
                    continue 'outer;
                }
            }
            i += 1;
        }

        // 2. Título seguido de nome capitalizado: "Dr. Smith" → PER
        for i in 0..tokens.len() {
            if !self.person_titles.contains(&lower[i]) {
                continue;
            }
            let mut j = i + 1;
            if tokens.get(j).is_some_and(|t| t.text == ".") {
                j += 1;
            }
            let mut begin = true;
            while j < tokens.len() && result[j].is_none() && is_capitalized(&tokens[j]) {
                result[j] = Some(Assigned {
                    label: "PER",
                    begin,
                    score: 0.80,
                });
                begin = false;
                j += 1;
            }
        }

        // 3. Sufixo societário: "Acme Inc" → ORG
        for i in 1..tokens.len() {
            if self.org_suffixes.contains(&lower[i])
                && result[i].is_none()
                && result[i - 1].is_none()
                && is_capitalized(&tokens[i - 1])
            {
                result[i - 1] = Some(Assigned {
                    label: "ORG",
                    begin: true,
                    score: 0.85,
                });
                result[i] = Some(Assigned {
                    label: "ORG",
                    begin: false,
                    score: 0.85,
                });
            }
        }

        result
    }

    /// Quebra o token em peças de até `max_piece_len` caracteres; as
    /// continuações recebem o prefixo `##`.
    fn pieces(&self, token: &Token) -> Vec<(String, usize, usize)> {
        let chars: Vec<char> = token.text.chars().collect();
        if chars.len() <= self.max_piece_len || !token.text.chars().all(char::is_alphanumeric) {
            return vec![(token.text.clone(), token.start, token.end)];
        }
        chars
            .chunks(self.max_piece_len)
            .enumerate()
            .map(|(n, chunk)| {
                let start = token.start + n * self.max_piece_len;
                let piece: String = chunk.iter().collect();
                let word = if n == 0 { piece } else { format!("##{piece}") };
                (word, start, start + chunk.len())
            })
            .collect()
    }
}

impl Default for GazetteerTagger {
    fn default() -> Self {
        Self::new(&Gazetteer::default())
    }
}

impl TokenClassifier for GazetteerTagger {
    fn classify(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let tokens = tokenize(text);
        let assigned = self.assign(&tokens);

        let mut out = Vec::with_capacity(tokens.len());
        for (token, tag) in tokens.iter().zip(assigned) {
            for (n, (word, start, end)) in self.pieces(token).into_iter().enumerate() {
                let (entity, score) = match tag {
                    Some(a) if a.begin && n == 0 => (format!("B-{}", a.label), Some(a.score)),
                    Some(a) => (format!("I-{}", a.label), Some(a.score)),
                    None => ("0".to_string(), None),
                };
                out.push(TaggedToken {
                    word,
                    entity,
                    start,
                    end,
                    score,
                });
            }
        }
        Ok(out)
    }
}

/// Carrega um [`GazetteerTagger`] por diretório de modelo.
#[derive(Debug, Clone, Default)]
pub struct GazetteerLoader;

impl ClassifierLoader for GazetteerLoader {
    fn load(&self, model_dir: &Path) -> Result<Arc<dyn TokenClassifier>> {
        Ok(Arc::new(GazetteerTagger::from_dir(model_dir)?))
    }
}

fn is_capitalized(token: &Token) -> bool {
    token.text.chars().next().is_some_and(char::is_uppercase)
}
