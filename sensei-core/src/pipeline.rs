//! # Pipeline NLP: Orquestrador
//!
//! O [`NlpPipeline`] conecta configuração, registro de modelos e backends:
//!
//! 1. **NER**: resolve o diretório do modelo, classifica os tokens, compila
//!    os spans IOB e recorta o texto de cada entidade do original.
//! 2. **Keyphrases**: detecta o idioma (se preciso), limpa o texto em
//!    parágrafos e extrai as frases de cada parágrafo em paralelo.
//! 3. **Idioma** e **parágrafos**: expostos diretamente.
//!
//! Todas as operações são síncronas; o servidor web as chama dentro de
//! `spawn_blocking`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{NlpError, Result};
use crate::keyphrase::{
    CandidateRanker, Keyphrase, KeyphraseExtractor, KeyphraseResult, LIMIT_KEYPHRASES,
};
use crate::lang::{detect_lang, LanguageDetector, StopwordDetector};
use crate::ner::{ClassifierLoader, GazetteerLoader, TokenClassifier};
use crate::paragraph::{clean_text, to_paragraph_list, TextInput};
use crate::registry::ModelRegistry;
use crate::tagger::{compile_entities, prepare_entity, EntitySpan, SpanCompiler, TaggedToken};

/// Modelo de NER usado quando nenhum é pedido.
pub const DEFAULT_NER_MODEL: &str = "default";

/// Opções de [`NlpPipeline::named_entities`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerOptions {
    /// Nome do modelo na tabela `ner.*` (ex: "default", "d4data/biomedical-ner-all").
    #[serde(default = "default_model")]
    pub model: String,
    /// Devolve os tokens IOB crus, sem compilar spans.
    #[serde(default)]
    pub raw: bool,
}

impl Default for NerOptions {
    fn default() -> Self {
        Self {
            model: default_model(),
            raw: false,
        }
    }
}

fn default_model() -> String {
    DEFAULT_NER_MODEL.to_string()
}

/// Saída do NER: entidades compiladas ou tokens crus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NerOutput {
    Entities(Vec<EntitySpan>),
    Raw(Vec<TaggedToken>),
}

/// Opções de [`NlpPipeline::keyphrases`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyphraseOptions {
    /// Idioma; detectado quando ausente.
    #[serde(default)]
    pub lang: Option<String>,
    /// Keyphrases por documento (teto de [`LIMIT_KEYPHRASES`]).
    #[serde(default = "default_top_n", rename = "topn")]
    pub top_n: usize,
    /// Junta os parágrafos em um único documento.
    #[serde(default)]
    pub flatten: bool,
}

impl Default for KeyphraseOptions {
    fn default() -> Self {
        Self {
            lang: None,
            top_n: default_top_n(),
            flatten: false,
        }
    }
}

fn default_top_n() -> usize {
    10
}

/// O pipeline principal, compartilhado entre requisições via `Arc`.
pub struct NlpPipeline {
    settings: Arc<Settings>,
    registry: Arc<ModelRegistry>,
    detector: Box<dyn LanguageDetector>,
    classifier_loader: Box<dyn ClassifierLoader>,
    classifiers: RwLock<HashMap<PathBuf, Arc<dyn TokenClassifier>>>,
    keyphrase_extractor: Box<dyn KeyphraseExtractor>,
}

impl NlpPipeline {
    /// Pipeline com os backends padrão e o registro derivado de `settings`.
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let registry = Arc::new(ModelRegistry::from_settings(settings.clone()));
        Self::with_registry(registry)
    }

    /// Pipeline sobre um registro já construído.
    pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
        Self {
            settings: Arc::new(registry.settings().clone()),
            registry,
            detector: Box::new(StopwordDetector::default()),
            classifier_loader: Box::new(GazetteerLoader),
            classifiers: RwLock::new(HashMap::new()),
            keyphrase_extractor: Box::new(CandidateRanker::default()),
        }
    }

    pub fn with_detector(mut self, detector: impl LanguageDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_classifier_loader(mut self, loader: impl ClassifierLoader + 'static) -> Self {
        self.classifier_loader = Box::new(loader);
        self
    }

    pub fn with_keyphrase_extractor(mut self, extractor: impl KeyphraseExtractor + 'static) -> Self {
        self.keyphrase_extractor = Box::new(extractor);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Garante um modelo pelo caminho pontuado (ex: `"spacy.en"`).
    pub fn ensure_model(&self, path: &str) -> Result<()> {
        self.registry.ensure_model(path)
    }

    /// Reconhecimento de entidades nomeadas.
    pub fn named_entities(&self, text: &str, opts: &NerOptions) -> Result<NerOutput> {
        self.check_length(text.chars().count())?;

        let model_path = self.registry.get_bert_model(&format!("ner.{}", opts.model))?;
        let classifier = self.classifier_for(&model_path)?;
        let tokens = classifier.classify(text)?;
        debug!(model = %opts.model, tokens = tokens.len(), "texto classificado");

        if opts.raw {
            return Ok(NerOutput::Raw(tokens));
        }

        let spans = if self.settings.flush_trailing_entity {
            let mut compiler = SpanCompiler::new();
            tokens.iter().for_each(|t| compiler.push(t));
            compiler.finish()
        } else {
            compile_entities(&tokens)
        };

        let model_id = model_path.to_string_lossy();
        Ok(NerOutput::Entities(
            spans
                .into_iter()
                .map(|span| prepare_entity(span, text, &model_id))
                .collect(),
        ))
    }

    /// Keyphrases por parágrafo (ou do texto inteiro, com `flatten`).
    pub fn keyphrases(&self, input: &TextInput, opts: &KeyphraseOptions) -> Result<KeyphraseResult> {
        self.check_length(input.char_len())?;

        let lang = match opts.lang.as_deref().filter(|l| !l.is_empty()) {
            Some(lang) => lang.to_string(),
            None => self.detect_lang(input)?,
        };

        let mut top_n = opts.top_n;
        if top_n > LIMIT_KEYPHRASES {
            warn!(top_n, limit = LIMIT_KEYPHRASES, "`topn` acima do limite, resultados serão cortados");
            top_n = LIMIT_KEYPHRASES;
        }

        let docs = clean_text(input, opts.flatten);
        let mut params = self.registry.vectorizer(&lang).unwrap_or_default();
        params.lowercase = false;

        let extractor = self.keyphrase_extractor.as_ref();
        let mut results: Vec<Vec<Keyphrase>> = docs
            .par_iter()
            .map(|doc| extractor.extract(doc, &params, top_n))
            .collect::<Result<_>>()?;
        info!(%lang, docs = docs.len(), "keyphrases extraídas");

        Ok(match results.len() {
            0 => KeyphraseResult::Flat(vec![]),
            1 => KeyphraseResult::Flat(results.pop().unwrap_or_default()),
            _ => KeyphraseResult::PerParagraph(results),
        })
    }

    /// Idioma do texto; `NotFound` quando não é possível decidir.
    pub fn detect_lang(&self, input: &TextInput) -> Result<String> {
        let text = match input {
            TextInput::Text(text) => text.clone(),
            TextInput::Paragraphs(pars) => pars.join("\n"),
        };
        detect_lang(self.detector.as_ref(), &text).ok_or_else(|| {
            NlpError::NotFound("Cannot detect language (maybe text too short?)".to_string())
        })
    }

    /// Parágrafos limpos e não vazios.
    pub fn paragraphs(&self, input: &TextInput) -> Result<Vec<String>> {
        self.check_length(input.char_len())?;
        Ok(to_paragraph_list(input))
    }

    fn check_length(&self, len: usize) -> Result<()> {
        if len > self.settings.max_length {
            return Err(NlpError::InvalidInput(format!(
                "text has {len} characters, maximum is {}",
                self.settings.max_length
            )));
        }
        Ok(())
    }

    fn classifier_for(&self, model_path: &Path) -> Result<Arc<dyn TokenClassifier>> {
        if let Some(c) = self
            .classifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_path)
        {
            return Ok(c.clone());
        }

        let classifier = self.classifier_loader.load(model_path)?;
        info!(path = %model_path.display(), "classificador carregado");
        self.classifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model_path.to_path_buf(), classifier.clone());
        Ok(classifier)
    }
}
