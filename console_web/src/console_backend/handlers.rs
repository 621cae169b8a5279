use super::error::WebError;
use super::AppState;
use actix_web::{web, HttpResponse, Responder};
use catalog::{Getter, QueryLabSession};
use common::types::{NodeType, SourceKind};
use pipeline::{NodeConfig, NodeConfigEditor};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ConnectionTestRequest {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub config: NodeConfig,
}

#[derive(Debug, Deserialize)]
pub struct AddNodeRequest {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenEditorRequest {
    #[serde(alias = "pipeline_id")]
    pub pipeline_id: String,
    #[serde(alias = "node_id")]
    pub node_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct TableFilter {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RunQueryRequest {
    pub sql: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSqlRequest {
    pub prompt: String,
}

/* ---------- connection tests ---------- */

/// Always answers 200; the verdict lives in the body.
pub async fn test_connection(
    state: web::Data<AppState>,
    body: web::Json<ConnectionTestRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let result = state
        .dispatcher
        .test_connection(req.node_type, req.subtype.as_deref(), &req.config)
        .await;
    HttpResponse::Ok().json(result)
}

pub async fn source_fields(path: web::Path<String>) -> impl Responder {
    let kind = SourceKind::from_subtype(&path.into_inner());
    HttpResponse::Ok().json(kind.fields())
}

/* ---------- pipelines ---------- */

pub async fn list_pipelines(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.pipelines())
}

pub async fn select_pipeline(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().json(state.store.select_pipeline(&path.into_inner()))
}

pub async fn add_node(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AddNodeRequest>,
) -> Result<HttpResponse, WebError> {
    let pipeline_id = path.into_inner();
    let req = body.into_inner();
    let node = state
        .store
        .add_node(&pipeline_id, req.node_type, req.subtype, req.name)
        .ok_or_else(|| WebError::not_found(format!("pipeline '{pipeline_id}'")))?;
    Ok(HttpResponse::Created().json(node))
}

pub async fn delete_node(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (pipeline_id, node_id) = path.into_inner();
    state.store.delete_node(&pipeline_id, &node_id);
    HttpResponse::NoContent().finish()
}

pub async fn save_node_config(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<NodeConfig>,
) -> Result<HttpResponse, WebError> {
    let (pipeline_id, node_id) = path.into_inner();
    let node = state
        .store
        .save_node_config(&pipeline_id, &node_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(node))
}

pub async fn analyze_pipeline(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let pipeline = state.store.get_pipeline(&path.into_inner())?;
    let analysis = state.advisor.analyze(&pipeline).await;
    Ok(HttpResponse::Ok().json(json!({ "analysis": analysis })))
}

pub async fn dashboard(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.summary())
}

/* ---------- config editor sessions ---------- */

fn session_id(raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw).map_err(|_| WebError::bad_request(format!("invalid session id '{raw}'")))
}

fn unknown_session(id: Uuid) -> WebError {
    WebError::not_found(format!("editor session {id}"))
}

fn unknown_query_session(id: Uuid) -> WebError {
    WebError::not_found(format!("query session {id}"))
}

pub async fn open_editor(
    state: web::Data<AppState>,
    body: web::Json<OpenEditorRequest>,
) -> Result<HttpResponse, WebError> {
    let req = body.into_inner();
    let node = state.store.get_node(&req.pipeline_id, &req.node_id)?;
    let editor = NodeConfigEditor::open(&req.pipeline_id, &node);
    let view = editor.masked_view();
    let id = state.sessions.open(editor);
    Ok(HttpResponse::Created().json(json!({ "sessionId": id, "view": view })))
}

pub async fn editor_view(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let view = state.sessions.view(id).ok_or_else(|| unknown_session(id))?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn set_editor_field(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SetFieldRequest>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let req = body.into_inner();
    let view = state
        .sessions
        .with(id, |editor| {
            editor.set_field(req.key, req.value);
            editor.masked_view()
        })
        .ok_or_else(|| unknown_session(id))?;
    Ok(HttpResponse::Ok().json(view))
}

/// Tests the editor's current scratch copy. When the config was edited,
/// another test started or the session closed while this one was running,
/// the answer is `{result: null, applied: false}`.
pub async fn test_editor_connection(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let (ticket, node_type, subtype, config) = state
        .sessions
        .with(id, |editor| {
            let ticket = editor.begin_test();
            (
                ticket,
                editor.node_type(),
                editor.subtype().map(str::to_string),
                editor.snapshot().clone(),
            )
        })
        .ok_or_else(|| unknown_session(id))?;

    let result = state
        .dispatcher
        .test_connection(node_type, subtype.as_deref(), &config)
        .await;

    let applied = state
        .sessions
        .with(id, |editor| editor.apply_test_result(ticket, result.clone()))
        .unwrap_or(false);
    // a superseded result is never shown
    let result = applied.then_some(result);
    Ok(HttpResponse::Ok().json(json!({ "result": result, "applied": applied })))
}

pub async fn save_editor(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let editor = state.sessions.close(id).ok_or_else(|| unknown_session(id))?;
    let node = editor.save(&state.store)?;
    Ok(HttpResponse::Ok().json(node))
}

pub async fn close_editor(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    state.sessions.close(id);
    Ok(HttpResponse::NoContent().finish())
}

/* ---------- catalog & query lab ---------- */

pub async fn list_tables(
    state: web::Data<AppState>,
    query: web::Query<TableFilter>,
) -> impl Responder {
    HttpResponse::Ok().json(state.catalog.list_tables(&query.q))
}

pub async fn preview_table(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let table = state.catalog.get_table(&path.into_inner())?;
    let rows = state.preview.load_preview(&table).await;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn run_query(
    state: web::Data<AppState>,
    body: web::Json<RunQueryRequest>,
) -> impl Responder {
    HttpResponse::Ok().json(state.query_lab.run_query(&body.sql).await)
}

pub async fn open_query_session(state: web::Data<AppState>) -> impl Responder {
    let id = state.query_sessions.open(QueryLabSession::new());
    HttpResponse::Created().json(json!({ "sessionId": id }))
}

pub async fn query_session_outcome(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let outcome = state
        .query_sessions
        .with(id, |session| session.outcome().cloned())
        .ok_or_else(|| unknown_query_session(id))?;
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

/// Runs `sql` for the session. Only the latest run's outcome is kept and
/// returned; a run overtaken by a newer one answers
/// `{outcome: null, applied: false}`.
pub async fn run_session_query(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RunQueryRequest>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    let ticket = state
        .query_sessions
        .with(id, QueryLabSession::begin_run)
        .ok_or_else(|| unknown_query_session(id))?;

    let outcome = state.query_lab.run_query(&body.sql).await;

    let applied = state
        .query_sessions
        .with(id, |session| session.complete_run(ticket, outcome.clone()))
        .unwrap_or(false);
    let outcome = applied.then_some(outcome);
    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome, "applied": applied })))
}

pub async fn close_query_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = session_id(&path.into_inner())?;
    state.query_sessions.close(id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn generate_sql(
    state: web::Data<AppState>,
    body: web::Json<GenerateSqlRequest>,
) -> impl Responder {
    let sql = state.query_lab.generate_sql(&body.prompt).await;
    HttpResponse::Ok().json(json!({ "sql": sql }))
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().finish()
}
