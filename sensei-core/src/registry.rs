//! # Registro de Modelos
//!
//! Cache do processo que mapeia `(engine, nome)` para um modelo carregado.
//! Os slots nascem vazios a partir das tabelas de [`Settings`], são
//! preenchidos no primeiro uso e nunca são removidos.
//!
//! ## Chaves
//!
//! | Chave               | Engine             | Valor em cache          |
//! |---------------------|--------------------|-------------------------|
//! | `spacy.en`          | [`Engine::Spacy`]    | [`ModelHandle`]       |
//! | `spacy_ner.en`      | [`Engine::SpacyNer`] | [`ModelHandle`]       |
//! | `bert.ner.default`  | [`Engine::Bert`]     | caminho local         |
//! | `vectorizer.de`     | [`Engine::Vectorizer`] | (só configuração)   |
//!
//! O carregamento de modelos de linguagem tenta até 3 vezes; a cada falha o
//! [`ModelFetcher`] é acionado para baixar o pacote ausente e o erro original
//! é relançado para a próxima tentativa. Primeiros carregamentos são
//! serializados por um mutex por chave: chamadas concorrentes ao mesmo
//! modelo não baixam duas vezes, e um clone lento de um modelo não trava o
//! carregamento dos outros.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Settings, VectorizerParams, LANG_USING_UDPIPE};
use crate::error::{NlpError, Result};
use crate::retry::{self, DEFAULT_ATTEMPTS};

/// Família de modelos do registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Pipeline de linguagem geral (tokens, POS).
    Spacy,
    /// Pipeline de linguagem específico para NER.
    SpacyNer,
    /// Checkpoints de classificação de tokens.
    Bert,
    /// Parâmetros do vetorizador de keyphrases.
    Vectorizer,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Spacy => "spacy",
            Engine::SpacyNer => "spacy_ner",
            Engine::Bert => "bert",
            Engine::Vectorizer => "vectorizer",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "spacy" => Some(Engine::Spacy),
            "spacy_ner" => Some(Engine::SpacyNer),
            "bert" => Some(Engine::Bert),
            "vectorizer" => Some(Engine::Vectorizer),
            _ => None,
        }
    }
}

/// Chave tipada de um modelo: engine + nome dentro da engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub engine: Engine,
    pub name: String,
}

impl ModelKey {
    pub fn new(engine: Engine, name: impl Into<String>) -> Self {
        Self {
            engine,
            name: name.into(),
        }
    }

    /// Interpreta um caminho pontuado `"<engine>.<resto>"`.
    ///
    /// Só o primeiro ponto separa: `bert.ner.default` → `(Bert, "ner.default")`.
    pub fn parse(path: &str) -> Result<Self> {
        let (engine, name) = path
            .split_once('.')
            .ok_or_else(|| NlpError::NotSupportedModel(path.to_string()))?;
        let engine =
            Engine::from_name(engine).ok_or_else(|| NlpError::NotSupportedModel(path.to_string()))?;
        Ok(Self::new(engine, name))
    }

    pub fn path(&self) -> String {
        format!("{}.{}", self.engine.name(), self.name)
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Um modelo carregado: diretório do pacote e seus metadados.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model_id: String,
    pub path: PathBuf,
    pub meta: serde_json::Value,
}

/// Handle compartilhado para um modelo em cache.
pub type ModelHandle = Arc<LoadedModel>;

/// Carrega um modelo a partir da fonte configurada.
pub trait ModelLoader: Send + Sync {
    fn load(&self, engine: Engine, model_id: &str) -> Result<LoadedModel>;
}

/// Baixa modelos ausentes (efeito colateral externo).
pub trait ModelFetcher: Send + Sync {
    /// Pede o download de um pacote de linguagem que falhou ao carregar.
    fn fetch_missing(&self, lang: &str, model_id: &str) -> Result<()>;
    /// Clona um repositório de modelo para `dest`.
    fn clone_repository(&self, hub_repo: &str, dest: &Path) -> Result<()>;
}

/// Arquivos de metadados reconhecidos, em ordem de preferência.
const META_FILES: &[&str] = &["meta.json", "config.json"];

/// Carrega pacotes de modelo de `<data_dir>/<model_id>`.
///
/// Um pacote é válido quando tem `meta.json` (pacotes de linguagem) ou
/// `config.json` (checkpoints de transformers).
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    data_dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl ModelLoader for DirectoryLoader {
    fn load(&self, _engine: Engine, model_id: &str) -> Result<LoadedModel> {
        let path = self.data_dir.join(model_id);
        for file in META_FILES {
            let meta_path = path.join(file);
            if meta_path.is_file() {
                let meta = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
                return Ok(LoadedModel {
                    model_id: model_id.to_string(),
                    path,
                    meta,
                });
            }
        }
        Err(NlpError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("modelo `{model_id}` não encontrado em {}", path.display()),
        )))
    }
}

/// Baixa modelos clonando repositórios do Hugging Face com `git`.
///
/// Pacotes de linguagem são buscados em `spacy/<model_id>`; idiomas UDPipe
/// não têm fonte remota e só geram aviso.
#[derive(Debug, Clone)]
pub struct HubFetcher {
    data_dir: PathBuf,
    base_url: String,
}

impl HubFetcher {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            base_url: "https://huggingface.co".to_string(),
        }
    }
}

impl ModelFetcher for HubFetcher {
    fn fetch_missing(&self, lang: &str, model_id: &str) -> Result<()> {
        if LANG_USING_UDPIPE.contains(&lang) {
            warn!(lang, model_id, "modelo UDPipe sem fonte remota configurada");
            return Ok(());
        }
        self.clone_repository(&format!("spacy/{model_id}"), &self.data_dir.join(model_id))
    }

    fn clone_repository(&self, hub_repo: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let url = format!("{}/{hub_repo}", self.base_url);
        info!(%url, dest = %dest.display(), "clonando modelo");

        let status = Command::new("git").arg("clone").arg(&url).arg(dest).status()?;
        if !status.success() {
            return Err(NlpError::Backend(format!("git clone {url} terminou com {status}")));
        }
        Ok(())
    }
}

/// Registro de modelos do processo, compartilhado via `Arc`.
pub struct ModelRegistry {
    settings: Arc<Settings>,
    loader: Box<dyn ModelLoader>,
    fetcher: Box<dyn ModelFetcher>,
    max_attempts: usize,
    spacy: RwLock<HashMap<String, ModelHandle>>,
    spacy_ner: RwLock<HashMap<String, ModelHandle>>,
    bert: RwLock<HashMap<String, PathBuf>>,
    load_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ModelRegistry {
    pub fn new(
        settings: Arc<Settings>,
        loader: Box<dyn ModelLoader>,
        fetcher: Box<dyn ModelFetcher>,
    ) -> Self {
        Self {
            settings,
            loader,
            fetcher,
            max_attempts: DEFAULT_ATTEMPTS,
            spacy: RwLock::new(HashMap::new()),
            spacy_ner: RwLock::new(HashMap::new()),
            bert: RwLock::new(HashMap::new()),
            load_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Registro com os colaboradores padrão ([`DirectoryLoader`] e [`HubFetcher`]).
    pub fn from_settings(settings: Arc<Settings>) -> Self {
        let data_dir = settings.data_dir().to_path_buf();
        Self::new(
            settings,
            Box::new(DirectoryLoader::new(data_dir.clone())),
            Box::new(HubFetcher::new(data_dir)),
        )
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A chave existe nas tabelas de configuração?
    pub fn is_supported(&self, key: &ModelKey) -> bool {
        let s = &self.settings;
        match key.engine {
            Engine::Spacy => s.spacy_lang_model.contains_key(&key.name),
            Engine::SpacyNer => s.spacy_ner_lang_model.contains_key(&key.name),
            Engine::Bert => s.bert_model.contains_key(&key.name),
            Engine::Vectorizer => s.vectorizer_lang_def.contains_key(&key.name),
        }
    }

    /// O slot já está preenchido?
    pub fn is_loaded(&self, key: &ModelKey) -> bool {
        match key.engine {
            Engine::Spacy => read(&self.spacy).contains_key(&key.name),
            Engine::SpacyNer => read(&self.spacy_ner).contains_key(&key.name),
            Engine::Bert => read(&self.bert).contains_key(&key.name),
            Engine::Vectorizer => self.is_supported(key),
        }
    }

    /// Garante o modelo descrito por um caminho pontuado (ex: `"spacy.en"`).
    pub fn ensure_model(&self, path: &str) -> Result<()> {
        self.ensure(&ModelKey::parse(path)?)
    }

    /// Garante que o slot de `key` esteja carregado ao retornar.
    pub fn ensure(&self, key: &ModelKey) -> Result<()> {
        if !self.is_supported(key) {
            return Err(NlpError::NotSupportedModel(key.path()));
        }
        match key.engine {
            Engine::Spacy => self.get_spacy_model(&key.name).map(drop),
            Engine::SpacyNer => self.get_spacy_ner_model(&key.name).map(drop),
            Engine::Bert => self.get_bert_model(&key.name).map(drop),
            // Vetorizadores são só configuração
            Engine::Vectorizer => Ok(()),
        }
    }

    /// Modelo de linguagem geral para `lang`.
    pub fn get_spacy_model(&self, lang: &str) -> Result<ModelHandle> {
        self.load_language_model(Engine::Spacy, lang)
    }

    /// Modelo de linguagem de NER para `lang`.
    pub fn get_spacy_ner_model(&self, lang: &str) -> Result<ModelHandle> {
        self.load_language_model(Engine::SpacyNer, lang)
    }

    /// Caminho local do modelo BERT `name` (ex: `"ner.default"`), clonando
    /// o repositório quando o diretório ainda não existe.
    pub fn get_bert_model(&self, name: &str) -> Result<PathBuf> {
        if let Some(path) = read(&self.bert).get(name) {
            return Ok(path.clone());
        }

        let spec = self
            .settings
            .bert_model
            .get(name)
            .ok_or_else(|| NlpError::NotSupportedModel(name.to_string()))?;

        let lock = self.load_lock(&ModelKey::new(Engine::Bert, name));
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = read(&self.bert).get(name) {
            return Ok(path.clone());
        }

        if !spec.path.exists() {
            info!(model = name, repo = %spec.hub_repo, "modelo BERT ausente no disco");
            if let Err(err) = self.fetcher.clone_repository(&spec.hub_repo, &spec.path) {
                // Clone incompleto não pode ficar no disco
                if spec.path.exists() {
                    if let Err(rm_err) = fs::remove_dir_all(&spec.path) {
                        warn!(path = %spec.path.display(), error = %rm_err, "não foi possível remover clone incompleto");
                    }
                }
                return Err(err);
            }
        }

        write(&self.bert).insert(name.to_string(), spec.path.clone());
        Ok(spec.path.clone())
    }

    /// Parâmetros do vetorizador para `lang`, se configurados.
    pub fn vectorizer(&self, lang: &str) -> Option<VectorizerParams> {
        self.settings.vectorizer_lang_def.get(lang).cloned()
    }

    fn load_language_model(&self, engine: Engine, lang: &str) -> Result<ModelHandle> {
        let (cache, table) = match engine {
            Engine::Spacy => (&self.spacy, &self.settings.spacy_lang_model),
            Engine::SpacyNer => (&self.spacy_ner, &self.settings.spacy_ner_lang_model),
            Engine::Bert | Engine::Vectorizer => {
                return Err(NlpError::NotSupportedModel(ModelKey::new(engine, lang).path()))
            }
        };
        let key = ModelKey::new(engine, lang);
        let model_id = table
            .get(lang)
            .ok_or_else(|| NlpError::NotSupportedModel(key.path()))?;

        if let Some(handle) = read(cache).get(lang) {
            debug!(model = %key, "modelo em cache");
            return Ok(handle.clone());
        }

        let lock = self.load_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Outra thread pode ter carregado enquanto esperávamos o lock
        if let Some(handle) = read(cache).get(lang) {
            return Ok(handle.clone());
        }

        let handle = retry::with_attempts(&key.path(), self.max_attempts, |attempt| {
            match self.loader.load(engine, model_id) {
                Ok(model) => Ok(Arc::new(model)),
                Err(err) => {
                    debug!(model = %key, attempt, error = %err, "pedindo download do modelo ausente");
                    if let Err(fetch_err) = self.fetcher.fetch_missing(lang, model_id) {
                        warn!(model = %key, error = %fetch_err, "download do modelo falhou");
                    }
                    Err(err)
                }
            }
        })?;

        info!(model = %key, model_id = %model_id, "modelo carregado");
        write(cache).insert(lang.to_string(), handle.clone());
        Ok(handle)
    }

    /// Mutex de primeiro carregamento de `key`, criado sob demanda.
    fn load_lock(&self, key: &ModelKey) -> Arc<Mutex<()>> {
        self.load_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.path())
            .or_default()
            .clone()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    /// Fetcher que "baixa" criando o pacote no diretório de dados.
    struct FakeFetcher {
        data_dir: PathBuf,
        fetches: Arc<AtomicUsize>,
        clones: Arc<AtomicUsize>,
        succeed: bool,
    }

    impl ModelFetcher for FakeFetcher {
        fn fetch_missing(&self, _lang: &str, model_id: &str) -> Result<()> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                write_package(&self.data_dir.join(model_id), "meta.json");
            }
            Ok(())
        }

        fn clone_repository(&self, _hub_repo: &str, dest: &Path) -> Result<()> {
            self.clones.fetch_add(1, Ordering::SeqCst);
            write_package(dest, "config.json");
            Ok(())
        }
    }

    fn write_package(dir: &Path, file: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(file), r#"{"name": "fake"}"#).unwrap();
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        registry: ModelRegistry,
        fetches: Arc<AtomicUsize>,
        clones: Arc<AtomicUsize>,
        data_dir: PathBuf,
    }

    fn fixture(succeed: bool) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().to_path_buf();
        let settings = Arc::new(Settings::with_data_dir(&data_dir));
        let fetches = Arc::new(AtomicUsize::new(0));
        let clones = Arc::new(AtomicUsize::new(0));
        let registry = ModelRegistry::new(
            settings,
            Box::new(DirectoryLoader::new(&data_dir)),
            Box::new(FakeFetcher {
                data_dir: data_dir.clone(),
                fetches: fetches.clone(),
                clones: clones.clone(),
                succeed,
            }),
        );
        Fixture {
            _tmp: tmp,
            registry,
            fetches,
            clones,
            data_dir,
        }
    }

    #[test]
    fn test_parse_key() {
        let key = ModelKey::parse("bert.ner.default").unwrap();
        assert_eq!(key, ModelKey::new(Engine::Bert, "ner.default"));
        assert_eq!(key.to_string(), "bert.ner.default");
        assert!(matches!(
            ModelKey::parse("spacy"),
            Err(NlpError::NotSupportedModel(_))
        ));
        assert!(matches!(
            ModelKey::parse("fasttext.en"),
            Err(NlpError::NotSupportedModel(_))
        ));
    }

    #[test]
    fn test_loads_existing_package_once() {
        let f = fixture(false);
        write_package(&f.data_dir.join("en_core_web_sm"), "meta.json");

        let first = f.registry.get_spacy_model("en").unwrap();
        let second = f.registry.get_spacy_model("en").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.model_id, "en_core_web_sm");
        assert_eq!(first.meta["name"], "fake");
        assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_package_fetched_then_loaded() {
        let f = fixture(true);
        f.registry.ensure_model("spacy.nl").unwrap();
        assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
        assert!(f.registry.is_loaded(&ModelKey::new(Engine::Spacy, "nl")));
        assert!(!f.registry.is_loaded(&ModelKey::new(Engine::SpacyNer, "nl")));
    }

    #[test]
    fn test_load_gives_up_after_three_attempts() {
        let f = fixture(false);
        let err = f.registry.get_spacy_ner_model("it").unwrap_err();
        assert_eq!(f.fetches.load(Ordering::SeqCst), 3);
        assert!(matches!(err, NlpError::ModelLoad { attempts: 3, .. }));
    }

    #[test]
    fn test_unsupported_keys() {
        let f = fixture(true);
        for path in ["spacy.xx", "bert.ner.unknown", "vectorizer.pt", "bert"] {
            let err = f.registry.ensure_model(path).unwrap_err();
            assert!(matches!(err, NlpError::NotSupportedModel(_)), "{path}");
        }
        assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_vectorizer_is_config_only() {
        let f = fixture(false);
        f.registry.ensure_model("vectorizer.de").unwrap();
        assert_eq!(
            f.registry.vectorizer("de").unwrap().stop_words.as_deref(),
            Some("german")
        );
        assert!(f.registry.vectorizer("pt").is_none());
    }

    #[test]
    fn test_bert_cloned_when_missing() {
        let f = fixture(true);
        let path = f.registry.get_bert_model("ner.default").unwrap();
        assert_eq!(path, f.data_dir.join("bert-large-NER"));
        assert!(path.join("config.json").is_file());
        assert_eq!(f.clones.load(Ordering::SeqCst), 1);

        // Segunda chamada vem do cache
        f.registry.ensure_model("bert.ner.default").unwrap();
        assert_eq!(f.clones.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bert_present_not_cloned() {
        let f = fixture(true);
        write_package(&f.data_dir.join("biomedical-ner-all"), "config.json");
        f.registry.get_bert_model("ner.d4data/biomedical-ner-all").unwrap();
        assert_eq!(f.clones.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bert_unsupported() {
        let f = fixture(true);
        assert!(matches!(
            f.registry.get_bert_model("ner.nope"),
            Err(NlpError::NotSupportedModel(name)) if name == "ner.nope"
        ));
    }

    #[test]
    fn test_concurrent_first_loads_fetch_once() {
        let f = fixture(true);
        let registry = &f.registry;

        let handles: Vec<ModelHandle> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| s.spawn(move || registry.get_spacy_model("nl").unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));

        let paths: Vec<PathBuf> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| s.spawn(move || registry.get_bert_model("ner.default").unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(f.clones.load(Ordering::SeqCst), 1);
        assert!(paths.iter().all(|p| *p == f.data_dir.join("bert-large-NER")));
    }

    /// Fetcher cujo clone fica parado até o teste liberar.
    struct GatedFetcher {
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl ModelFetcher for GatedFetcher {
        fn fetch_missing(&self, _lang: &str, _model_id: &str) -> Result<()> {
            Ok(())
        }

        fn clone_repository(&self, _hub_repo: &str, dest: &Path) -> Result<()> {
            self.started.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            write_package(dest, "config.json");
            Ok(())
        }
    }

    #[test]
    fn test_slow_clone_does_not_block_other_models() {
        let tmp = tempfile::tempdir().unwrap();
        write_package(&tmp.path().join("en_core_web_sm"), "meta.json");
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let registry = ModelRegistry::new(
            Arc::new(Settings::with_data_dir(tmp.path())),
            Box::new(DirectoryLoader::new(tmp.path())),
            Box::new(GatedFetcher {
                started: Mutex::new(started_tx),
                release: Mutex::new(release_rx),
            }),
        );

        std::thread::scope(|s| {
            let release_tx = release_tx;
            let bert = s.spawn(|| registry.get_bert_model("ner.default"));
            started_rx.recv().unwrap();

            // Clone do BERT em andamento; o modelo de linguagem carrega mesmo assim
            let en = registry.get_spacy_model("en").unwrap();
            assert_eq!(en.model_id, "en_core_web_sm");

            release_tx.send(()).unwrap();
            assert!(bert.join().unwrap().is_ok());
        });
    }

    /// O primeiro clone cria o diretório e falha no meio.
    struct InterruptedCloneFetcher {
        clones: Arc<AtomicUsize>,
    }

    impl ModelFetcher for InterruptedCloneFetcher {
        fn fetch_missing(&self, _lang: &str, _model_id: &str) -> Result<()> {
            Ok(())
        }

        fn clone_repository(&self, _hub_repo: &str, dest: &Path) -> Result<()> {
            let n = self.clones.fetch_add(1, Ordering::SeqCst);
            fs::create_dir_all(dest)?;
            if n == 0 {
                return Err(NlpError::Backend("clone interrompido".into()));
            }
            write_package(dest, "config.json");
            Ok(())
        }
    }

    #[test]
    fn test_interrupted_clone_is_retried_on_next_call() {
        let tmp = tempfile::tempdir().unwrap();
        let clones = Arc::new(AtomicUsize::new(0));
        let registry = ModelRegistry::new(
            Arc::new(Settings::with_data_dir(tmp.path())),
            Box::new(DirectoryLoader::new(tmp.path())),
            Box::new(InterruptedCloneFetcher {
                clones: clones.clone(),
            }),
        );

        let err = registry.get_bert_model("ner.default").unwrap_err();
        assert!(matches!(err, NlpError::Backend(_)));
        assert!(!tmp.path().join("bert-large-NER").exists());
        assert!(!registry.is_loaded(&ModelKey::new(Engine::Bert, "ner.default")));

        let path = registry.get_bert_model("ner.default").unwrap();
        assert!(path.join("config.json").is_file());
        assert_eq!(clones.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_udpipe_languages_are_not_fetched() {
        let tmp = tempfile::tempdir().unwrap();
        HubFetcher::new(tmp.path()).fetch_missing("fi", "fi").unwrap();
        assert!(!tmp.path().join("fi").exists());
    }
}
