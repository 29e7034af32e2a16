//! Servidor HTTP Axum para NER, keyphrases, detecção de idioma e parágrafos

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use sensei_core::{
    paragraph::TextInput, KeyphraseOptions, NerOptions, NlpError, NlpPipeline, Settings,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: NlpPipeline,
    token: String,
}

#[derive(Deserialize)]
struct NerRequest {
    text: String,
    #[serde(flatten)]
    opts: NerOptions,
}

#[derive(Deserialize)]
struct KeyphraseRequest {
    text: Value,
    #[serde(flatten)]
    opts: KeyphraseOptions,
}

#[derive(Deserialize)]
struct TextRequest {
    text: Value,
    #[serde(default)]
    flatten: bool,
}

#[derive(Deserialize)]
struct EnsureRequest {
    path: String,
}

/// Erro de API: vira `{"error": msg}` com o status adequado
enum ApiError {
    Nlp(NlpError),
    Unauthorized,
    Internal(String),
}

impl From<NlpError> for ApiError {
    fn from(err: NlpError) -> Self {
        ApiError::Nlp(err)
    }
}

// Corpo malformado (campo ausente, tipo errado) é entrada inválida, não 422 em texto puro
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Nlp(NlpError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Nlp(err) => {
                let status = match &err {
                    NlpError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    NlpError::NotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    NlpError::NotSupportedModel(_) => StatusCode::NOT_FOUND,
                    NlpError::ModelLoad { .. } | NlpError::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!(error = %err, "requisição falhou");
                }
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let port = settings.server_port;
    let state = Arc::new(AppState {
        token: settings.token.clone(),
        pipeline: NlpPipeline::new(settings),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("🚀 Servidor NLP iniciado em http://localhost:{port}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // route_layer só cobre as rotas declaradas antes dele: /health fica aberto
    Router::new()
        .route("/ner", post(ner_handler))
        .route("/keyphrases", post(keyphrases_handler))
        .route("/lang", post(lang_handler))
        .route("/paragraphs", post(paragraphs_handler))
        .route("/models/ensure", post(ensure_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Exige `Authorization: Bearer <token>` quando `NLP_TOKEN` está definido
async fn require_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.token.is_empty() {
        return Ok(next.run(req).await);
    }
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|t| t == state.token);
    if !authorized {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

/// Executa uma operação do pipeline fora do runtime (todas são síncronas)
async fn run_blocking<T, F>(state: &Arc<AppState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&NlpPipeline) -> sensei_core::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.pipeline))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn ner_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let out = run_blocking(&state, move |p| p.named_entities(&req.text, &req.opts)).await?;
    Ok(Json(out))
}

async fn keyphrases_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<KeyphraseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let input = TextInput::try_from(&req.text)?;
    let out = run_blocking(&state, move |p| p.keyphrases(&input, &req.opts)).await?;
    Ok(Json(out))
}

async fn lang_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let input = TextInput::try_from(&req.text)?;
    let lang = run_blocking(&state, move |p| p.detect_lang(&input)).await?;
    Ok(Json(json!({ "lang": lang })))
}

async fn paragraphs_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let input = TextInput::try_from(&req.text)?;
    let pars = run_blocking(&state, move |p| p.paragraphs(&input)).await?;
    if req.flatten {
        return Ok(Json(Value::String(pars.join(" "))));
    }
    Ok(Json(json!(pars)))
}

async fn ensure_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnsureRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let path = req.path.clone();
    run_blocking(&state, move |p| p.ensure_model(&path)).await?;
    Ok(Json(json!({ "path": req.path, "status": "ready" })))
}
