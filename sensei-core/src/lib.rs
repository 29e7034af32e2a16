//! # sensei-core: Camada de Orquestração NLP
//!
//! Este crate não treina nem implementa modelos: ele organiza o que acontece
//! ao redor deles. Texto entra, é segmentado, passa por um backend plugável
//! e volta como entidades, keyphrases ou um código de idioma.
//!
//! ## Arquitetura
//!
//! 1.  **Entrada**: texto bruto ou lista de parágrafos ([`paragraph::TextInput`]).
//! 2.  **Segmentação** ([`paragraph`]): parágrafos com offsets em caracteres.
//! 3.  **Registro** ([`registry`]): resolve `engine.nome` para um modelo
//!     carregado, baixando o que falta com retentativas ([`retry`]).
//! 4.  **Backends**:
//!     *   **NER** ([`ner`]): classificação de tokens em IOB.
//!     *   **Keyphrases** ([`keyphrase`]): ranqueamento de frases candidatas.
//!     *   **Idioma** ([`lang`]): detecção por prefixos crescentes.
//! 5.  **Compilação de spans** ([`tagger`]): tokens IOB → [`EntitySpan`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sensei_core::paragraph::segment;
//!
//! let pars = segment("Primeiro parágrafo.\n\nSegundo.");
//! assert_eq!(pars.len(), 2);
//! assert_eq!(pars[1].start_char, 21);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta configuração, registro e backends.
//! - [`config`]: tabelas de modelos e variáveis de ambiente.
//! - [`error`]: taxonomia de erros do crate.

pub mod config;
pub mod error;
pub mod keyphrase;
pub mod lang;
pub mod ner;
pub mod paragraph;
pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod stopwords;
pub mod tagger;
pub mod tokenizer;

pub use config::Settings;
pub use error::{NlpError, Result};
pub use keyphrase::{Keyphrase, KeyphraseResult};
pub use paragraph::{segment, Paragraph, TextInput};
pub use pipeline::{KeyphraseOptions, NerOptions, NerOutput, NlpPipeline};
pub use registry::{Engine, ModelKey, ModelRegistry};
pub use tagger::{compile_entities, EntitySpan, TaggedToken};
