//! Servidor web Axum com WebSocket para anotação standoff em tempo real

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use standoff_core::{
    corpus::demo_texts,
    pipeline::{split_lines, PipelineEvent},
    Annotation, ConfigError, GazetteerRecognizer, RecognizerConfig, StandoffRecognizer,
    TokenizerMode,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Pausa entre eventos enviados pelo WebSocket (animação passo a passo na UI)
const WS_EVENT_DELAY_MS: u64 = 35;

/// Estado compartilhado da aplicação: um reconhecedor por estratégia de tokenização.
struct AppState {
    default_mode: TokenizerMode,
    word_punctuation: GazetteerRecognizer,
    unicode_words: GazetteerRecognizer,
}

impl AppState {
    fn from_config(config: &RecognizerConfig) -> Result<Self, ConfigError> {
        let classifier = config.classifier()?;
        let watched = config.watched();
        info!(
            entries = classifier.len(),
            watched = ?watched.sorted(),
            "gazetteer carregado"
        );

        Ok(Self {
            default_mode: config.tokenizer_mode,
            word_punctuation: StandoffRecognizer::new(classifier.clone(), watched.clone())
                .with_tokenizer_mode(TokenizerMode::WordPunctuation),
            unicode_words: StandoffRecognizer::new(classifier, watched)
                .with_tokenizer_mode(TokenizerMode::UnicodeWords),
        })
    }

    fn recognizer(&self, mode: Option<TokenizerMode>) -> &GazetteerRecognizer {
        match mode.unwrap_or(self.default_mode) {
            TokenizerMode::WordPunctuation => &self.word_punctuation,
            TokenizerMode::UnicodeWords => &self.unicode_words,
        }
    }
}

#[derive(Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    tokenizer_mode: Option<TokenizerMode>,
    /// Processa as linhas em paralelo (rayon)
    #[serde(default)]
    parallel: bool,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
    #[serde(default)]
    tokenizer_mode: Option<TokenizerMode>,
}

#[derive(Serialize)]
struct AnnotateResponse {
    annotations: Vec<Annotation>,
    total_lines: usize,
    processing_ms: u64,
}

#[derive(Deserialize)]
struct IndexQuery {
    #[serde(default)]
    text: Option<String>,
}

struct DemoText {
    domain: &'static str,
    text: &'static str,
}

/// Página principal: formulário + tabela de anotações
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    text: String,
    annotations: Vec<Annotation>,
    watched: String,
    demos: Vec<DemoText>,
    error: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let state = Arc::new(AppState::from_config(&config)?);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🚀 Servidor standoff iniciado em http://{address}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// `STANDOFF_CONFIG` aponta para um TOML opcional; o ambiente sempre tem a palavra final.
fn load_config() -> Result<RecognizerConfig, ConfigError> {
    match std::env::var("STANDOFF_CONFIG") {
        Ok(path) => RecognizerConfig::from_file(path)?.with_env_override(),
        Err(_) => RecognizerConfig::from_env(),
    }
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/annotate", post(annotate_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Página HTML; com `?text=` já mostra as anotações
async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> impl IntoResponse {
    let text = query.text.unwrap_or_default();
    let recognizer = state.recognizer(None);

    let (annotations, error) = if text.trim().is_empty() {
        (vec![], String::new())
    } else {
        match recognizer.annotate(&text) {
            Ok(annotations) => (annotations, String::new()),
            Err(e) => (vec![], e.to_string()),
        }
    };

    let page = IndexTemplate {
        text,
        annotations,
        watched: recognizer.watched().sorted().join(", "),
        demos: demo_texts()
            .into_iter()
            .map(|(domain, text)| DemoText { domain, text })
            .collect(),
        error,
    };

    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!(error = %e, "falha ao renderizar template");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Anotação via HTTP POST (sem streaming)
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnotateRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let start = std::time::Instant::now();
    let recognizer = state.recognizer(req.tokenizer_mode);
    let triples = if req.parallel {
        recognizer.extract_parallel(&req.text)
    } else {
        recognizer.extract(&req.text)
    };

    match triples {
        Ok(triples) => Json(AnnotateResponse {
            annotations: triples
                .into_iter()
                .map(|t| Annotation::from_triple(t, &req.text))
                .collect(),
            total_lines: split_lines(&req.text).len(),
            processing_ms: start.elapsed().as_millis() as u64,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "falha na anotação");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe texto, executa o pipeline e envia os eventos em sequência
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // JSON {text, tokenizer_mode}; senão usa a mensagem como texto puro
                let (text, mode) = match serde_json::from_str::<WsRequest>(&text) {
                    Ok(req) => (req.text, req.tokenizer_mode),
                    Err(_) => (text, None),
                };

                if text.trim().is_empty() {
                    continue;
                }

                info!("Anotando via WebSocket [{:?}]: {} bytes", mode, text.len());

                // O pipeline é síncrono: roda fora do runtime e os eventos ficam no canal
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let pipeline_state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline_state.recognizer(mode).extract_streaming(&text, tx);
                });
                if let Err(e) = handle.await {
                    warn!(error = %e, "pipeline interrompido");
                    continue;
                }

                // O pipeline já terminou: todos os eventos estão no canal
                let events: Vec<PipelineEvent> = rx.try_iter().collect();

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(WS_EVENT_DELAY_MS))
                            .await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
