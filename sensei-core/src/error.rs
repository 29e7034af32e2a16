//! # Erros do sensei-core
//!
//! Taxonomia única para todo o crate. Falhas transitórias de carregamento são
//! repetidas localmente (ver [`crate::retry`]) e só chegam aqui depois da última
//! tentativa; modelos não suportados e idiomas não detectados sobem imediatamente.

/// Erros que podem ocorrer no pipeline NLP.
#[derive(Debug, thiserror::Error)]
pub enum NlpError {
    /// Idioma não detectado (texto curto demais ou ambíguo).
    #[error("{0}")]
    NotFound(String),

    /// Chave de modelo/idioma ausente das tabelas de configuração.
    #[error("The model `{0}` is not supported.")]
    NotSupportedModel(String),

    /// Carregamento falhou em todas as tentativas.
    #[error("failed to load model `{model}` after {attempts} attempt(s)")]
    ModelLoad {
        model: String,
        attempts: usize,
        #[source]
        source: Box<NlpError>,
    },

    /// Entrada com formato errado (ex: `text` que não é string nem lista).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Variável de ambiente com valor inválido.
    #[error("configuration error: {0}")]
    Config(String),

    /// Backend externo (classificador, extrator) devolveu erro.
    #[error("backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NlpError {
    /// Falhas que valem nova tentativa de carregamento.
    pub fn is_transient(&self) -> bool {
        matches!(self, NlpError::Io(_) | NlpError::Json(_) | NlpError::Backend(_))
    }
}

/// Tipo de resultado do crate.
pub type Result<T> = std::result::Result<T, NlpError>;
