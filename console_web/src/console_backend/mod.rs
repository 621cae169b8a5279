pub mod error;
pub mod handlers;
pub mod sessions;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use catalog::{MemoryCatalog, PreviewService, QueryLab};
use common::config::components::genai::GenAiConfig;
use connector::ConnectionDispatcher;
use pipeline::{PipelineAdvisor, PipelineStore};
use shared_clients::genai::{GeminiClient, GenerativeModel};

use self::handlers::*;
use self::sessions::{EditorSessions, QuerySessions, SessionMap};

/// Everything a request handler can reach. Cloning shares the same stores.
#[derive(Clone)]
pub struct AppState {
    pub store: PipelineStore,
    pub catalog: MemoryCatalog,
    pub dispatcher: ConnectionDispatcher,
    pub preview: PreviewService,
    pub query_lab: QueryLab,
    pub advisor: PipelineAdvisor,
    pub sessions: EditorSessions,
    pub query_sessions: QuerySessions,
}

impl AppState {
    pub fn new(
        store: PipelineStore,
        catalog: MemoryCatalog,
        dispatcher: ConnectionDispatcher,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self {
            store,
            query_lab: QueryLab::new(catalog.clone(), model.clone()),
            preview: PreviewService::new(model.clone()),
            advisor: PipelineAdvisor::new(model),
            catalog,
            dispatcher,
            sessions: EditorSessions::default(),
            query_sessions: QuerySessions::default(),
        }
    }

    /// Replaces the idle timeout of both session maps. Call before serving.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionMap::new("editor", ttl);
        self.query_sessions = SessionMap::new("query", ttl);
        self
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub addr: String,
    pub static_dir: Option<PathBuf>,
    pub session_ttl: Duration,
    pub seed: Option<PathBuf>,
    pub genai: GenAiConfig,
}

/// Registers every `/api` route. Shared by the server and the handler tests.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/connect/test", web::post().to(test_connection))
            .route("/connect/fields/{subtype}", web::get().to(source_fields))
            .route("/pipelines", web::get().to(list_pipelines))
            .route("/pipelines/{id}", web::get().to(select_pipeline))
            .route("/pipelines/{id}/nodes", web::post().to(add_node))
            .route(
                "/pipelines/{id}/nodes/{node_id}",
                web::delete().to(delete_node),
            )
            .route(
                "/pipelines/{id}/nodes/{node_id}/config",
                web::put().to(save_node_config),
            )
            .route("/pipelines/{id}/analyze", web::post().to(analyze_pipeline))
            .route("/dashboard", web::get().to(dashboard))
            .route("/editor/sessions", web::post().to(open_editor))
            .route("/editor/sessions/{sid}", web::get().to(editor_view))
            .route("/editor/sessions/{sid}", web::delete().to(close_editor))
            .route("/editor/sessions/{sid}/fields", web::put().to(set_editor_field))
            .route(
                "/editor/sessions/{sid}/test",
                web::post().to(test_editor_connection),
            )
            .route("/editor/sessions/{sid}/save", web::post().to(save_editor))
            .route("/catalog/tables", web::get().to(list_tables))
            .route("/catalog/tables/{id}/preview", web::get().to(preview_table))
            .route("/query/run", web::post().to(run_query))
            .route("/query/sessions", web::post().to(open_query_session))
            .route("/query/sessions/{sid}", web::get().to(query_session_outcome))
            .route("/query/sessions/{sid}", web::delete().to(close_query_session))
            .route("/query/sessions/{sid}/run", web::post().to(run_session_query))
            .route("/query/generate", web::post().to(generate_sql)),
    )
    .route("/healthz", web::get().to(health_handler));
}

pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("failed to {what}: {err}");
    io::Error::other(format!("failed to {what}: {err}"))
}

pub async fn run_backend(cfg: BackendConfig) -> io::Result<()> {
    let seed = cfg.seed.as_deref();
    let store = PipelineStore::load_from(seed).map_err(|e| startup_error("load pipelines", e))?;
    let catalog = MemoryCatalog::load_from(seed).map_err(|e| startup_error("load catalog", e))?;
    let model = GeminiClient::new(&cfg.genai)
        .map_err(|e| startup_error("build generative client", e))?;
    if cfg.genai.api_key.is_none() {
        log::warn!("no generative API key configured; AI features will return fallback text");
    }

    let state = web::Data::new(
        AppState::new(
            store,
            catalog,
            ConnectionDispatcher::default(),
            Arc::new(model),
        )
        .with_session_ttl(cfg.session_ttl),
    );
    let static_dir = cfg.static_dir.clone();

    log::info!("starting console backend on {}", cfg.addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(api_routes);

        if let Some(dir) = static_dir.clone() {
            app = app.service(
                Files::new("/", dir)
                    .prefer_utf8(true)
                    .index_file("index.html"),
            );
        }

        app
    })
    .bind(cfg.addr)?
    .run()
    .await
}
