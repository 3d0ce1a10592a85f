//! Single-page web UI.
//!
//! | Route | Effect |
//! |-------|--------|
//! | `GET /` | render the session log |
//! | `POST /ask` | compare a query and append it to the log |
//! | `POST /settings` | change template, raw style and display toggles |
//! | `POST /clear` | start a fresh log |
//!
//! All POST routes redirect back to `/`. One session is shared by every
//! client. Its lock is held only to read settings and to append entries, so
//! the page stays responsive while a comparison is running.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use minijinja::{context, Environment};
use pb_prompt::RawPromptStyle;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::HarnessConfig;
use crate::pipeline::{ComparisonPipeline, PathOptions};
use crate::session::{SessionEntry, UiSession, UiSettings};

const PAGE_TEMPLATE: &str = "page.html";

/// Web UI errors.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("failed to render page: {0}")]
    Render(#[from] minijinja::Error),

    #[error("unknown template choice: {0}")]
    UnknownTemplate(String),

    #[error("unknown raw prompt style: {0}")]
    UnknownRawStyle(String),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = match self {
            UiError::UnknownTemplate(_) | UiError::UnknownRawStyle(_) => StatusCode::BAD_REQUEST,
            UiError::Render(_) | UiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self, %status, "request failed");
        (status, self.to_string()).into_response()
    }
}

/// Shared state behind every route.
pub struct UiState {
    pipeline: ComparisonPipeline,
    template_choices: Vec<PathBuf>,
    session: Mutex<UiSession>,
    pages: Environment<'static>,
}

impl UiState {
    /// Create the state with an empty log and the given initial settings.
    pub fn new(
        pipeline: ComparisonPipeline,
        template_choices: Vec<PathBuf>,
        settings: UiSettings,
    ) -> Result<Self, UiError> {
        let mut pages = Environment::new();
        pages.add_template(PAGE_TEMPLATE, include_str!("../templates/page.html"))?;

        Ok(Self {
            pipeline,
            template_choices,
            session: Mutex::new(UiSession::new(settings)),
            pages,
        })
    }

    /// State for a harness config, metrics shown and prompts hidden.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, UiError> {
        let mut config = config.clone();
        config.ensure_template_choice();

        let settings = UiSettings {
            template_path: config.template_path.clone(),
            raw_style: config.raw_style,
            show_metrics: true,
            show_prompts: false,
        };
        Self::new(
            ComparisonPipeline::from_config(&config),
            config.template_choices,
            settings,
        )
    }
}

#[derive(Debug, Deserialize)]
struct AskForm {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SettingsForm {
    template: String,
    raw_style: String,
    /// Checkboxes are absent from the form when unchecked
    show_metrics: Option<String>,
    show_prompts: Option<String>,
}

/// Build the UI router.
pub fn router(state: Arc<UiState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ask", post(ask_handler))
        .route("/settings", post(settings_handler))
        .route("/clear", post(clear_handler))
        .with_state(state)
}

/// Serve the UI on `addr` until the process exits.
pub async fn serve(config: &HarnessConfig, addr: SocketAddr) -> Result<(), UiError> {
    let state = Arc::new(UiState::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "web UI listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler(State(state): State<Arc<UiState>>) -> Result<Html<String>, UiError> {
    let session = state.session.lock().await;
    let choices: Vec<String> = state
        .template_choices
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let page = state.pages.get_template(PAGE_TEMPLATE)?.render(context! {
        entries => session.log.entries(),
        settings => &session.settings,
        template_choices => choices,
        engine => state.pipeline.engine_name(),
        model => state.pipeline.model(),
    })?;
    Ok(Html(page))
}

async fn ask_handler(State(state): State<Arc<UiState>>, Form(form): Form<AskForm>) -> Redirect {
    let query = form.query.trim();
    if query.is_empty() {
        return Redirect::to("/");
    }

    let options = {
        let session = state.session.lock().await;
        PathOptions {
            template_path: session.settings.template_path.clone(),
            raw_style: session.settings.raw_style,
        }
    };
    let entry = match state.pipeline.compare_with(query, &options).await {
        Ok(record) => SessionEntry::comparison(record),
        Err(e) => SessionEntry::Failed {
            query: query.to_string(),
            error: e.to_string(),
        },
    };
    state.session.lock().await.log.push(entry);
    Redirect::to("/")
}

async fn settings_handler(
    State(state): State<Arc<UiState>>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, UiError> {
    let template_path = state
        .template_choices
        .iter()
        .find(|p| p.display().to_string() == form.template)
        .cloned()
        .ok_or_else(|| UiError::UnknownTemplate(form.template.clone()))?;
    let raw_style = RawPromptStyle::parse(&form.raw_style)
        .ok_or_else(|| UiError::UnknownRawStyle(form.raw_style.clone()))?;

    let mut session = state.session.lock().await;
    session.settings = UiSettings {
        template_path,
        raw_style,
        show_metrics: form.show_metrics.is_some(),
        show_prompts: form.show_prompts.is_some(),
    };
    tracing::debug!(settings = ?session.settings, "settings updated");
    Ok(Redirect::to("/"))
}

async fn clear_handler(State(state): State<Arc<UiState>>) -> Redirect {
    state.session.lock().await.clear();
    Redirect::to("/")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use pb_inference::{InferenceClient, InferenceConfig};
    use pb_prompt::{MiniJinjaEngine, TemplateEngine, TemplateRenderer};
    use std::time::Duration;
    use tower::ServiceExt;

    struct Fixture {
        _dir: tempfile::TempDir,
        state: Arc<UiState>,
        chat: PathBuf,
        elaborate: PathBuf,
    }

    fn fixture() -> Fixture {
        fixture_with("cat")
    }

    fn fixture_with(script: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let chat = dir.path().join("chat.prompt");
        let elaborate = dir.path().join("elaborate_chat.prompt");
        std::fs::write(&chat, "Q: {{ user_input }}").unwrap();
        std::fs::write(&elaborate, "Please explain in depth: {{ user_input }}").unwrap();

        let engine: Box<dyn TemplateEngine> = Box::new(MiniJinjaEngine::new());
        let pipeline = ComparisonPipeline::new(
            TemplateRenderer::new(engine),
            InferenceClient::new(
                InferenceConfig::command("sh", ["-c", script], "mock-model")
                    .with_timeout(Duration::from_secs(10)),
            ),
            PathOptions {
                template_path: chat.clone(),
                raw_style: RawPromptStyle::Structured,
            },
        );
        let settings = UiSettings {
            template_path: chat.clone(),
            raw_style: RawPromptStyle::Structured,
            show_metrics: true,
            show_prompts: false,
        };
        let state = UiState::new(pipeline, vec![chat.clone(), elaborate.clone()], settings).unwrap();

        Fixture {
            _dir: dir,
            state: Arc::new(state),
            chat,
            elaborate,
        }
    }

    fn form(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn encode(s: &str) -> String {
        s.replace('%', "%25")
            .replace(' ', "+")
            .replace('?', "%3F")
            .replace('/', "%2F")
    }

    async fn page(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_page_renders() {
        let fx = fixture();
        let app = router(fx.state.clone());

        let html = page(&app).await;
        assert!(html.contains("No questions yet."));
        assert!(html.contains("mock-model"));
    }

    #[tokio::test]
    async fn test_ask_appends_comparison() {
        let fx = fixture();
        let app = router(fx.state.clone());

        let response = app
            .clone()
            .oneshot(form("/ask", format!("query={}", encode("What is AI?"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        {
            let session = fx.state.session.lock().await;
            assert_eq!(session.log.len(), 1);
            assert_eq!(session.log.entries()[0].query(), "What is AI?");
        }

        let html = page(&app).await;
        assert!(html.contains("Templated response"));
        assert!(html.contains("Q: What is AI?"));
        assert!(html.contains("Overhead:"));
    }

    #[tokio::test]
    async fn test_page_renders_while_comparison_runs() {
        let fx = fixture_with("sleep 2; cat");
        let app = router(fx.state.clone());

        let ask = tokio::spawn(
            app.clone()
                .oneshot(form("/ask", format!("query={}", encode("What is AI?")))),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        let html = tokio::time::timeout(Duration::from_millis(500), page(&app))
            .await
            .expect("page blocked by running comparison");
        assert!(html.contains("No questions yet."));

        let response = ask.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(fx.state.session.lock().await.log.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let fx = fixture();
        let app = router(fx.state.clone());

        app.clone().oneshot(form("/ask", "query=+++".to_string())).await.unwrap();
        assert!(fx.state.session.lock().await.log.is_empty());
    }

    #[tokio::test]
    async fn test_settings_select_template_and_style() {
        let fx = fixture();
        let app = router(fx.state.clone());

        let body = format!(
            "template={}&raw_style=concise&show_prompts=on",
            encode(&fx.elaborate.display().to_string())
        );
        let response = app.clone().oneshot(form("/settings", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        app.clone()
            .oneshot(form("/ask", format!("query={}", encode("What is AI?"))))
            .await
            .unwrap();

        let session = fx.state.session.lock().await;
        assert_eq!(session.settings.template_path, fx.elaborate);
        assert!(!session.settings.show_metrics);
        assert!(session.settings.show_prompts);
        let SessionEntry::Comparison { record, .. } = &session.log.entries()[0] else {
            panic!("expected comparison");
        };
        assert_eq!(record.templated.prompt.text, "Please explain in depth: What is AI?");
        assert_eq!(
            record.raw.prompt.text,
            "You are a helpful assistant. Answer this question clearly: What is AI?"
        );
    }

    #[tokio::test]
    async fn test_unknown_settings_are_rejected() {
        let fx = fixture();
        let app = router(fx.state.clone());

        let response = app
            .clone()
            .oneshot(form("/settings", "template=nope.prompt&raw_style=concise".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = format!(
            "template={}&raw_style=verbose",
            encode(&fx.chat.display().to_string())
        );
        let response = app.clone().oneshot(form("/settings", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_template_shows_error_row() {
        let fx = fixture();
        let app = router(fx.state.clone());
        std::fs::remove_file(&fx.chat).unwrap();

        app.clone()
            .oneshot(form("/ask", "query=hello".to_string()))
            .await
            .unwrap();

        let html = page(&app).await;
        assert!(html.contains("Request failed: template not found"));
    }

    #[tokio::test]
    async fn test_clear_empties_log() {
        let fx = fixture();
        let app = router(fx.state.clone());

        app.clone()
            .oneshot(form("/ask", "query=hello".to_string()))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(form("/clear", String::new()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(fx.state.session.lock().await.log.is_empty());
        assert!(page(&app).await.contains("No questions yet."));
    }
}
