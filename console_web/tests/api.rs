use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use catalog::{MemoryCatalog, QueryLab};
use common::types::sources::MASK;
use connector::ConnectionDispatcher;
use console_web::{api_routes, AppState};
use parking_lot::Mutex;
use pipeline::PipelineStore;
use serde_json::{json, Value};
use std::sync::Arc;
use test_utils::genai::RecordingModel;
use test_utils::probes::FakeProbe;
use uuid::Uuid;

fn app_state(reply: &str) -> web::Data<AppState> {
    let dispatcher = ConnectionDispatcher::new(
        Arc::new(FakeProbe::succeeding()),
        Arc::new(FakeProbe::succeeding()),
        Arc::new(FakeProbe::succeeding()),
    );
    web::Data::new(AppState::new(
        PipelineStore::default(),
        MemoryCatalog::default(),
        dispatcher,
        Arc::new(RecordingModel::with_text(reply)),
    ))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(api_routes)).await
    };
}

#[actix_web::test]
async fn connection_test_answers_200_with_verdict() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/connect/test")
        .set_json(json!({
            "type": "SOURCE",
            "subtype": "postgres",
            "config": { "host": "db", "port": "5432", "database": "d", "username": "u" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "success": false, "message": "Missing required connection details." })
    );

    let req = test::TestRequest::post()
        .uri("/api/connect/test")
        .set_json(json!({ "type": "TRANSFORM", "config": {} }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Connection verified.");
}

#[actix_web::test]
async fn field_schema_by_subtype() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/connect/fields/bigquery")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let fields = body.as_array().expect("array");
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2]["key"], "serviceAccountJson");
    assert_eq!(fields[2]["sensitive"], true);

    let req = test::TestRequest::get().uri("/api/connect/fields/kafka").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn node_lifecycle_over_http() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/pipelines/p-1/nodes")
        .set_json(json!({ "type": "DESTINATION" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let node: Value = test::read_body_json(resp).await;
    assert_eq!(node["name"], "New Destination");
    assert_eq!(node["status"], "idle");
    assert_eq!(state.store.select_pipeline("p-1").nodes.len(), 4);

    let req = test::TestRequest::post()
        .uri("/api/pipelines/p-404/nodes")
        .set_json(json!({ "type": "SOURCE", "subtype": "kafka" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().is_some());

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri("/api/pipelines/p-1/nodes/n-2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
    assert_eq!(state.store.select_pipeline("p-1").nodes.len(), 3);

    let req = test::TestRequest::get().uri("/api/pipelines/unknown").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], "p-1");
}

#[actix_web::test]
async fn put_config_replaces_mapping() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::put()
        .uri("/api/pipelines/p-2/nodes/n-4/config")
        .set_json(json!({ "host": "db", "port": "5432" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["config"], json!({ "host": "db", "port": "5432" }));

    let req = test::TestRequest::put()
        .uri("/api/pipelines/p-2/nodes/n-99/config")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn editor_session_flow() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/editor/sessions")
        .set_json(json!({ "pipelineId": "p-2", "nodeId": "n-4" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let sid = body["sessionId"].as_str().expect("session id").to_string();
    assert_eq!(body["view"]["fields"].as_array().map(Vec::len), Some(5));

    for (key, value) in [
        ("host", "db.example.com"),
        ("port", "5432"),
        ("database", "orders"),
        ("username", "app"),
        ("password", "hunter2"),
    ] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/editor/sessions/{sid}/fields"))
            .set_json(json!({ "key": key, "value": value }))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert!(view["testResult"].is_null());
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/editor/sessions/{sid}"))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["config"]["password"], MASK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/editor/sessions/{sid}/test"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["applied"], true);
    assert_eq!(
        body["result"]["message"],
        "Successfully connected to PostgreSQL (Backend Verified)."
    );

    let req = test::TestRequest::post()
        .uri(&format!("/api/editor/sessions/{sid}/save"))
        .to_request();
    let node: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(node["config"]["password"], "hunter2");
    assert!(state.sessions.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/editor/sessions/{sid}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn closing_editor_discards_edits() {
    let state = app_state("");
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/editor/sessions")
        .set_json(json!({ "pipeline_id": "p-1", "node_id": "n-1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let sid = body["sessionId"].as_str().expect("session id").to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/editor/sessions/{sid}/fields"))
        .set_json(json!({ "key": "topic", "value": "events" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/editor/sessions/{sid}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let node = state.store.get_node("p-1", "n-1").expect("node");
    assert!(node.config.is_none());
}

fn bare_state() -> AppState {
    AppState::new(
        PipelineStore::default(),
        MemoryCatalog::default(),
        ConnectionDispatcher::default(),
        Arc::new(RecordingModel::with_text("")),
    )
}

macro_rules! open_session {
    ($app:expr, $uri:expr, $body:expr) => {{
        let req = test::TestRequest::post().uri($uri).set_json($body).to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["sessionId"].as_str().expect("session id").to_string()
    }};
}

#[actix_web::test]
async fn edit_during_test_discards_its_result() {
    let mut state = bare_state();
    let editing: Arc<Mutex<Option<Uuid>>> = Arc::default();
    let sessions = state.sessions.clone();
    let target = editing.clone();
    let probe = FakeProbe::succeeding().on_call(move || {
        if let Some(id) = *target.lock() {
            sessions.with(id, |editor| editor.set_field("host", "replica.example.com"));
        }
    });
    state.dispatcher = ConnectionDispatcher::default().with_postgres_probe(Arc::new(probe));
    let state = web::Data::new(state);
    let app = app!(state);

    let sid = open_session!(
        app,
        "/api/editor/sessions",
        json!({ "pipelineId": "p-2", "nodeId": "n-4" })
    );
    for (key, value) in [
        ("host", "db.example.com"),
        ("port", "5432"),
        ("database", "orders"),
        ("username", "app"),
        ("password", "hunter2"),
    ] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/editor/sessions/{sid}/fields"))
            .set_json(json!({ "key": key, "value": value }))
            .to_request();
        test::call_service(&app, req).await;
    }
    *editing.lock() = Some(Uuid::parse_str(&sid).expect("uuid"));

    let req = test::TestRequest::post()
        .uri(&format!("/api/editor/sessions/{sid}/test"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "result": null, "applied": false }));

    let req = test::TestRequest::get()
        .uri(&format!("/api/editor/sessions/{sid}"))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert!(view["testResult"].is_null());
    assert_eq!(view["testing"], false);
    assert_eq!(view["config"]["host"], "replica.example.com");
}

#[actix_web::test]
async fn query_session_keeps_only_latest_outcome() {
    let mut state = bare_state();
    let running: Arc<Mutex<Option<Uuid>>> = Arc::default();
    let query_sessions = state.query_sessions.clone();
    let target = running.clone();
    let model = RecordingModel::with_text("Rename the column.").on_call(move || {
        if let Some(id) = *target.lock() {
            query_sessions.with(id, |session| {
                session.begin_run();
            });
        }
    });
    state.query_lab = QueryLab::new(state.catalog.clone(), Arc::new(model));
    let state = web::Data::new(state);
    let app = app!(state);

    let sid = open_session!(app, "/api/query/sessions", json!({}));

    let req = test::TestRequest::post()
        .uri(&format!("/api/query/sessions/{sid}/run"))
        .set_json(json!({ "sql": "select 1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["outcome"]["rows"][0]["result"], "Success");

    let req = test::TestRequest::get()
        .uri(&format!("/api/query/sessions/{sid}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"]["columns"], json!(["id", "result", "rows_affected"]));

    // a newer run starts while this one waits for its explanation
    *running.lock() = Some(Uuid::parse_str(&sid).expect("uuid"));
    let req = test::TestRequest::post()
        .uri(&format!("/api/query/sessions/{sid}/run"))
        .set_json(json!({ "sql": "select error" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "outcome": null, "applied": false }));

    let req = test::TestRequest::get()
        .uri(&format!("/api/query/sessions/{sid}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["outcome"].is_null());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/query/sessions/{sid}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(state.query_sessions.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/query/sessions/{sid}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn catalog_and_query_lab() {
    let state = app_state("Rename the column.");
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/catalog/tables?q=STAGING")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["rowCount"], 45_000_000);

    let req = test::TestRequest::post()
        .uri("/api/query/run")
        .set_json(json!({ "sql": "select Error from t" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["error"],
        "Syntax error at or near 'ERROR': column 'undefined_col' does not exist"
    );
    assert_eq!(body["explanation"], "Rename the column.");

    let req = test::TestRequest::post()
        .uri("/api/query/run")
        .set_json(json!({ "sql": "select 1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["columns"], json!(["id", "result", "rows_affected"]));
    assert_eq!(body["rows"][1]["result"], "Pending");

    let req = test::TestRequest::post()
        .uri("/api/query/generate")
        .set_json(json!({ "prompt": "  " }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["sql"].is_null());
}

#[actix_web::test]
async fn preview_of_unknown_table_is_404() {
    let state = app_state("[]");
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/catalog/tables/t-1/preview")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    let req = test::TestRequest::get()
        .uri("/api/catalog/tables/t-404/preview")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn dashboard_analysis_and_health() {
    let state = app_state("- batch the aggregator");
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalPipelines"], 3);
    assert_eq!(body["failingPipelines"], 1);

    let req = test::TestRequest::post()
        .uri("/api/pipelines/p-2/analyze")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["analysis"], "- batch the aggregator");

    let req = test::TestRequest::post()
        .uri("/api/pipelines/p-404/analyze")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
