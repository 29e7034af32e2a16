//! # Configuração
//!
//! Tabelas estáticas (idiomas → modelos, parâmetros de vetorizador, caminhos
//! dos modelos BERT) e valores lidos do ambiente (porta, token, tamanho
//! máximo de documento, diretório de dados).
//!
//! | Variável                    | Padrão   |
//! |-----------------------------|----------|
//! | `NLP_SERVER_PORT`           | `80`     |
//! | `NLP_TOKEN`                 | `""`     |
//! | `MAX_LENGTH_DEFAULT`        | `450000` |
//! | `NLP_DATA_DIR`              | `./data` |
//! | `NLP_FLUSH_TRAILING_ENTITY` | `false`  |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NlpError, Result};

/// Tamanho máximo padrão de documento (em caracteres).
pub const MAX_LENGTH_DEFAULT: usize = 450_000;

/// Idiomas servidos por pacotes UDPipe (o nome do modelo é o próprio código).
pub const LANG_USING_UDPIPE: &[&str] = &["sk", "cs", "fi", "lv"];

/// Idioma → nome do pacote de modelo de linguagem.
const SPACY_LANG_MODEL: &[(&str, &str)] = &[
    ("en", "en_core_web_sm"),
    ("sk", "sk"),
    ("cs", "cs"),
    ("pl", "pl_spacy_model"),
    ("el", "el_core_news_sm"),
    ("fi", "fi"),
    ("lv", "lv"),
    ("nl", "nl_core_news_sm"),
    ("it", "it_core_news_sm"),
    ("es", "es_core_news_sm"),
];

/// Modelos BERT: chave `<tarefa>.<nome>` → (diretório local, repositório no hub).
const BERT_MODEL: &[(&str, &str, &str)] = &[
    ("ner.default", "bert-large-NER", "dslim/bert-large-NER"),
    (
        "ner.d4data/biomedical-ner-all",
        "biomedical-ner-all",
        "d4data/biomedical-ner-all",
    ),
    (
        "ner.alvaroalon2/biobert_diseases_ner",
        "biobert_diseases_ner",
        "alvaroalon2/biobert_diseases_ner",
    ),
];

/// Parâmetros do vetorizador de keyphrases para um idioma.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Pipeline de linguagem usado para marcar POS.
    pub spacy_pipeline: Option<String>,
    /// Nome da lista de stopwords (ex: "english").
    pub stop_words: Option<String>,
    /// Padrão POS das frases candidatas (ex: `<ADJ.*>*<N.*>+`).
    pub pos_pattern: Option<String>,
    /// Preserva a grafia original das frases.
    #[serde(default)]
    pub lowercase: bool,
}

/// Entrada da tabela de modelos BERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BertModelSpec {
    pub path: PathBuf,
    pub hub_repo: String,
}

/// Configuração completa do processo.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_port: u16,
    pub token: String,
    pub max_length: usize,
    pub data_dir: PathBuf,
    pub flush_trailing_entity: bool,
    pub spacy_lang_model: HashMap<String, String>,
    pub spacy_ner_lang_model: HashMap<String, String>,
    pub vectorizer_lang_def: HashMap<String, VectorizerParams>,
    pub bert_model: HashMap<String, BertModelSpec>,
}

impl Settings {
    /// Tabelas padrão com os modelos sob `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let spacy_lang_model: HashMap<String, String> = SPACY_LANG_MODEL
            .iter()
            .map(|(lang, model)| (lang.to_string(), model.to_string()))
            .collect();

        let bert_model = BERT_MODEL
            .iter()
            .map(|(key, dir, repo)| {
                (
                    key.to_string(),
                    BertModelSpec {
                        path: data_dir.join(dir),
                        hub_repo: repo.to_string(),
                    },
                )
            })
            .collect();

        Self {
            server_port: 80,
            token: String::new(),
            max_length: MAX_LENGTH_DEFAULT,
            data_dir,
            flush_trailing_entity: false,
            spacy_ner_lang_model: spacy_lang_model.clone(),
            spacy_lang_model,
            vectorizer_lang_def: default_vectorizers(),
            bert_model,
        }
    }

    /// Lê a configuração do ambiente do processo.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual a [`Settings::from_env`], mas com uma fonte de variáveis injetável.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("NLP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let mut settings = Self::with_data_dir(data_dir);

        if let Some(port) = lookup("NLP_SERVER_PORT") {
            settings.server_port = parse_var("NLP_SERVER_PORT", &port)?;
        }
        if let Some(token) = lookup("NLP_TOKEN") {
            settings.token = token;
        }
        if let Some(max) = lookup("MAX_LENGTH_DEFAULT") {
            settings.max_length = parse_var("MAX_LENGTH_DEFAULT", &max.replace('_', ""))?;
        }
        if let Some(flag) = lookup("NLP_FLUSH_TRAILING_ENTITY") {
            settings.flush_trailing_entity = parse_flag("NLP_FLUSH_TRAILING_ENTITY", &flag)?;
        }
        Ok(settings)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

fn default_vectorizers() -> HashMap<String, VectorizerParams> {
    let entry = |pipeline: &str, stop_words: &str, pos: Option<&str>| VectorizerParams {
        spacy_pipeline: Some(pipeline.to_string()),
        stop_words: Some(stop_words.to_string()),
        pos_pattern: pos.map(str::to_string),
        lowercase: false,
    };

    HashMap::from([
        ("en".to_string(), entry("en_core_web_sm", "english", None)),
        (
            "de".to_string(),
            entry("de_core_news_sm", "german", Some("<ADJ.*>*<N.*>+")),
        ),
        ("fr".to_string(), entry("fr_core_news_sm", "french", None)),
    ])
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| NlpError::Config(format!("{name}: valor inválido `{value}`")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(NlpError::Config(format!("{name}: valor inválido `{value}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_without_env() {
        let s = Settings::from_lookup(env(&[])).unwrap();
        assert_eq!(s.server_port, 80);
        assert_eq!(s.token, "");
        assert_eq!(s.max_length, 450_000);
        assert!(!s.flush_trailing_entity);
        assert_eq!(s.spacy_lang_model["en"], "en_core_web_sm");
        assert_eq!(s.bert_model["ner.default"].path, PathBuf::from("data/bert-large-NER"));
    }

    #[test]
    fn test_env_overrides() {
        let s = Settings::from_lookup(env(&[
            ("NLP_SERVER_PORT", "8080"),
            ("NLP_TOKEN", "segredo"),
            ("MAX_LENGTH_DEFAULT", "1_000"),
            ("NLP_DATA_DIR", "/srv/models"),
            ("NLP_FLUSH_TRAILING_ENTITY", "true"),
        ]))
        .unwrap();
        assert_eq!(s.server_port, 8080);
        assert_eq!(s.token, "segredo");
        assert_eq!(s.max_length, 1000);
        assert!(s.flush_trailing_entity);
        assert_eq!(
            s.bert_model["ner.d4data/biomedical-ner-all"].path,
            PathBuf::from("/srv/models/biomedical-ner-all")
        );
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = Settings::from_lookup(env(&[("NLP_SERVER_PORT", "porta")])).unwrap_err();
        assert!(matches!(err, NlpError::Config(_)));
    }

    #[test]
    fn test_vectorizer_table() {
        let s = Settings::default();
        assert_eq!(
            s.vectorizer_lang_def["de"].pos_pattern.as_deref(),
            Some("<ADJ.*>*<N.*>+")
        );
        assert!(s.vectorizer_lang_def["fr"].pos_pattern.is_none());
    }
}
