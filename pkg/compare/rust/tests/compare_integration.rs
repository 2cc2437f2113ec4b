// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! End-to-end comparison loading against an in-process repository server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use weblab_compare::visualizers::Visualization;
use weblab_compare::{ClientConfig, Comparator, CompareRoute, Error};

const PLOTS: &str = "\
Plot title,File name,Data file name,Line style,First variable id,Optional second variable id
Action potential,trace.png,trace.csv,linespoints,time,V
";

const CONTENTS: &str = "\
Variable id,Variable name,Units,Number of dimensions,File name,Type
time,Time,ms,1,trace.csv,Raw
V,Membrane voltage,mV,1,trace.csv,Raw
";

#[derive(Clone, Default)]
struct MockServer {
    entities: Arc<HashMap<String, Value>>,
    files: Arc<HashMap<String, String>>,
    /// Version id -> how long to stall the entity info request.
    delays: Arc<HashMap<String, Duration>>,
    downloads: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
}

async fn entity_infos(State(server): State<MockServer>, Json(body): Json<Value>) -> Json<Value> {
    *server.last_request.lock().unwrap() = Some(body.clone());
    let ids: Vec<String> = body["ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if ids.iter().any(|id| id == "broken") {
        return Json(json!({
            "notifications": {"errors": ["lookup failed"]},
            "getEntityInfos": {"response": false, "responseText": "no such version"}
        }));
    }

    let delay = ids
        .iter()
        .filter_map(|id| server.delays.get(id))
        .max()
        .copied()
        .unwrap_or_default();
    tokio::time::sleep(delay).await;

    let entities: Vec<Value> = ids
        .iter()
        .filter_map(|id| server.entities.get(id).cloned())
        .collect();
    Json(json!({
        "notifications": {"errors": [], "notes": []},
        "getEntityInfos": {"response": true, "entities": entities}
    }))
}

async fn download(
    State(server): State<MockServer>,
    Path((entity, file)): Path<(String, String)>,
) -> Result<String, StatusCode> {
    server.downloads.fetch_add(1, Ordering::SeqCst);
    server
        .files
        .get(&format!("{}/{}", entity, file))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

fn experiment(id: &str, model: &str, protocol: &str, files: &[&str]) -> Value {
    let files: Vec<Value> = files
        .iter()
        .map(|name| {
            json!({
                "id": format!("{}-{}", id, name),
                "name": name,
                "filetype": if name.ends_with(".csv") { "text/csv" } else { "text/plain" },
                "size": 64,
                "url": format!("/download/{}/{}", id, name),
            })
        })
        .collect();
    json!({
        "id": id.parse::<u64>().unwrap(),
        "entityId": format!("exp-{}-{}", model, protocol),
        "name": format!("{} & {}", model, protocol),
        "version": format!("v{}", id),
        "model": {"id": model, "name": model, "version": "1"},
        "protocol": {"id": protocol, "name": protocol, "version": "1"},
        "files": files,
    })
}

fn fixture() -> MockServer {
    let meta = ["outputs-default-plots.csv", "outputs-contents.csv"];
    let mut entities = HashMap::new();
    entities.insert(
        "1".to_string(),
        experiment("1", "LR91", "S1S2", &[meta[0], meta[1], "trace.csv", "errors.txt"]),
    );
    entities.insert(
        "2".to_string(),
        experiment("2", "TT06", "S1S2", &[meta[0], meta[1], "trace.csv"]),
    );
    entities.insert(
        "3".to_string(),
        experiment("3", "ORd", "S1S2", &[meta[0], meta[1], "trace.csv", "extra.csv"]),
    );
    entities.insert(
        "4".to_string(),
        experiment("4", "LR91", "Steady", &["trace.csv"]),
    );

    let mut files = HashMap::new();
    for id in ["1", "2"] {
        files.insert(format!("{}/{}", id, meta[0]), PLOTS.to_string());
        files.insert(format!("{}/{}", id, meta[1]), CONTENTS.to_string());
    }
    // Entity 3 lists its plot descriptor but the server cannot serve it.
    files.insert(format!("3/{}", meta[1]), CONTENTS.to_string());
    files.insert("1/trace.csv".into(), "time,V\n0,-84\n1,20\n2,-10\n3,-84\n".into());
    files.insert("2/trace.csv".into(), "time,V\n0,-86\n1,30\n2,0\n3,-86\n".into());
    files.insert("3/trace.csv".into(), "time,V\n0,-88\n1,40\n2,10\n3,-88\n".into());
    files.insert("3/extra.csv".into(), "a,b\n1,2\n".into());
    files.insert("1/errors.txt".into(), "none\n".into());
    files.insert("4/trace.csv".into(), "time,V\n0,-80\n1,-80\n".into());

    let mut delays = HashMap::new();
    delays.insert("4".to_string(), Duration::from_secs(2));

    MockServer {
        entities: Arc::new(entities),
        files: Arc::new(files),
        delays: Arc::new(delays),
        ..MockServer::default()
    }
}

async fn start(server: MockServer) -> Comparator {
    let app = Router::new()
        .route("/compare/:entity_type/*rest", post(entity_infos))
        .route("/download/:entity/:file", get(download))
        .with_state(server);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: 10,
        ..ClientConfig::default()
    };
    Comparator::new(config).unwrap()
}

fn route(path: &str) -> CompareRoute {
    CompareRoute::parse(path).unwrap()
}

#[tokio::test]
async fn test_load_groups_files_across_entities() {
    let server = fixture();
    let comparator = start(server.clone()).await;

    let session = comparator
        .load(&route("/compare/experiment/1/2/3/"))
        .await
        .unwrap();

    let request = server.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request["task"], "getEntityInfos");
    assert_eq!(request["getBy"], "versionId");
    assert_eq!(request["ids"], json!(["1", "2", "3"]));

    assert_eq!(session.title, "Comparison of models under S1S2");
    let labels: Vec<&str> = session.entities.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["LR91", "TT06", "ORd"]);

    let trace = session.file_by_name("trace.csv").unwrap();
    assert_eq!(trace.entries.len(), 3);
    assert_eq!(trace.entity_count(), 3);
    assert_eq!(session.file_by_name("extra.csv").unwrap().entity_count(), 1);
    assert_eq!(session.file_by_name("errors.txt").unwrap().entries[0].entity, 0);

    // A missing descriptor only drops that entity's metadata.
    assert!(session.entities[0].metadata.is_some());
    assert!(session.entities[1].metadata.is_some());
    assert!(session.entities[2].metadata.is_none());
    let annotation = &session.entities[0].annotations["trace.csv"];
    assert_eq!(annotation.title, "Action potential");
    assert_eq!(annotation.x_label.as_deref(), Some("Time (ms)"));

    let default = session.default_visualization.as_ref().unwrap();
    assert_eq!(default.file_name, "trace.csv");
    assert_eq!(default.plugin, "displayPlotFlot");
    assert_eq!(
        session.redirect.as_ref().map(CompareRoute::to_path).as_deref(),
        Some("/compare/experiment/1/2/3/show/trace.csv/displayPlotFlot")
    );
}

#[tokio::test]
async fn test_selected_route_has_no_redirect() {
    let comparator = start(fixture()).await;
    let session = comparator
        .load(&route("/compare/experiment/1/2/show/errors.txt/displayContent"))
        .await
        .unwrap();
    assert!(session.redirect.is_none());
    assert!(session.default_visualization.is_some());
}

#[tokio::test]
async fn test_missing_version_becomes_note() {
    let comparator = start(fixture()).await;
    let session = comparator
        .load(&route("/compare/experiment/2/99/"))
        .await
        .unwrap();
    assert_eq!(session.entities.len(), 1);
    assert_eq!(session.entities[0].version.id, "2");
    assert!(session.notifications.notes.iter().any(|n| n.contains("99")));
}

#[tokio::test]
async fn test_server_rejection_is_an_error() {
    let comparator = start(fixture()).await;
    let err = comparator
        .load(&route("/compare/experiment/broken/"))
        .await
        .unwrap_err();
    match err {
        Error::Server { task, message } => {
            assert_eq!(task, "getEntityInfos");
            assert_eq!(message, "no such version");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_render_default_plot() {
    let comparator = start(fixture()).await;
    let session = comparator
        .load(&route("/compare/experiment/1/2/3/"))
        .await
        .unwrap();

    let Some(Visualization::Flot(view)) = comparator.render_selection(&session).await.unwrap()
    else {
        panic!("expected a flot plot");
    };
    assert_eq!(view.title, "Action potential");
    assert_eq!(view.x_label.as_deref(), Some("Time (ms)"));
    assert_eq!(view.y_label.as_deref(), Some("Membrane voltage (mV)"));
    let labels: Vec<&str> = view.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["LR91: V", "TT06: V", "ORd: V"]);
    // linespoints keeps every point of the first entity.
    assert_eq!(view.series[0].data.len(), 4);
}

#[tokio::test]
async fn test_rendering_reuses_cached_files() {
    let server = fixture();
    let comparator = start(server.clone()).await;
    let session = comparator
        .load(&route("/compare/experiment/1/2/"))
        .await
        .unwrap();

    comparator
        .render(&session, "trace.csv", "displayPlotHC")
        .await
        .unwrap();
    let after_first = server.downloads.load(Ordering::SeqCst);
    comparator
        .render(&session, "trace.csv", "displayTable")
        .await
        .unwrap();
    assert_eq!(server.downloads.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn test_diff_between_two_versions() {
    let comparator = start(fixture()).await;
    let session = comparator
        .load(&route("/compare/experiment/1/2/"))
        .await
        .unwrap();
    let Visualization::Diff(view) = comparator
        .render(&session, "trace.csv", "displayUnixDiff")
        .await
        .unwrap()
    else {
        panic!("expected a diff");
    };
    assert_eq!(view.from, "LR91");
    assert_eq!(view.to, "TT06");
    assert_eq!(view.inserted, 4);
    assert_eq!(view.deleted, 4);
}

#[tokio::test]
async fn test_unknown_visualizer() {
    let comparator = start(fixture()).await;
    let session = comparator
        .load(&route("/compare/experiment/1/"))
        .await
        .unwrap();
    let err = comparator
        .render(&session, "trace.csv", "displayNothing")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownVisualizer(ref id) if id == "displayNothing"));
}

#[tokio::test]
async fn test_newer_load_cancels_older() {
    let comparator = Arc::new(start(fixture()).await);

    let slow = {
        let comparator = comparator.clone();
        tokio::spawn(async move { comparator.load(&route("/compare/experiment/4/")).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let fast = comparator.load(&route("/compare/experiment/1/")).await.unwrap();
    assert_eq!(fast.entities.len(), 1);

    let slow = slow.await.unwrap();
    assert!(matches!(slow, Err(Error::Cancelled)));
}
