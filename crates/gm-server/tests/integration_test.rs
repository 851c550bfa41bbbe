//! End-to-end integration tests for the catalog HTTP API.
//!
//! Tests exercise the full stack: HTTP request -> axum router -> handler ->
//! CatalogService -> rules/storage -> HTTP response.
//!
//! Each test builds a fresh AppState over a private in-memory SQLite catalog
//! and uses `tower::ServiceExt::oneshot` to send requests directly to the
//! router without starting a network server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use gm_server::router::build_router;
use gm_server::state::AppState;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn test_app() -> Router {
    let state = AppState::in_memory().expect("failed to create in-memory AppState");
    build_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

/// Sends a POST request with a JSON body and returns (status, json).
async fn post_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
}

/// Sends a GET request and returns (status, json).
async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::builder().uri(path).body(Body::empty()).unwrap()).await
}

/// Sends a DELETE request and returns (status, json).
async fn delete_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn create_function(
    app: &Router,
    name: &str,
    function_type: &str,
    gene_type: &str,
    params: serde_json::Value,
) -> i64 {
    let (status, body) = post_json(
        app,
        "/functions",
        json!({
            "name": name,
            "type": function_type,
            "gene_type": gene_type,
            "code": "",
            "params": params
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create function failed: {:?}", body);
    body["id"].as_i64().unwrap()
}

async fn create_node(app: &Router, name: &str, node_type: &str, gene_type: &str) -> i64 {
    let (status, body) = post_json(
        app,
        "/nodes",
        json!({ "name": name, "type": node_type, "gene_type": gene_type }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create node failed: {:?}", body);
    body["id"].as_i64().unwrap()
}

async fn create_graph(app: &Router, name: &str) -> i64 {
    let (status, body) = post_json(app, "/graphs", json!({ "name": name })).await;
    assert_eq!(status, StatusCode::OK, "create graph failed: {:?}", body);
    body["id"].as_i64().unwrap()
}

async fn place(
    app: &Router,
    name: &str,
    node: &str,
    graph: &str,
    parent: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        "/links/node-graph",
        json!({ "name": name, "node": node, "graph": graph, "parent": parent }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_program_detail_is_empty() {
    let app = test_app();
    let (status, _) = post_json(&app, "/programs", json!({ "name": "P" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(&app, "/programs/P").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "P");
    assert_eq!(body["library_ids"], json!([]));
    assert_eq!(body["global_var_ids"], json!([]));
    assert_eq!(body["graph_ids"], json!([]));
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let app = test_app();
    create_graph(&app, "g").await;
    let (status, body) = post_json(&app, "/graphs", json!({ "name": "g" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["kind"], "graph");
    assert_eq!(body["error"]["details"]["key"], "g");
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let app = test_app();
    let (status, body) = get_json(&app, "/nodes/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = get_json(&app, "/functions/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn function_detail_carries_params_and_nodes() {
    let app = test_app();
    let fid = create_function(
        &app,
        "mutate",
        "mutation",
        "int",
        json!([{ "name": "rate", "type": "double" }]),
    )
    .await;
    let nid = create_node(&app, "n", "unary_node", "int").await;
    let (status, _) = post_json(
        &app,
        "/links/function-node",
        json!({ "function": fid, "node": "n", "args": ["0.5"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(&app, &format!("/functions/{}", fid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "mutation");
    assert_eq!(body["params"][0]["name"], "rate");
    assert_eq!(body["node_ids"], json!([nid]));
}

#[tokio::test]
async fn bulk_params_with_collision_insert_nothing() {
    let app = test_app();
    create_function(&app, "f", "any", "int", json!([{ "name": "x", "type": "int" }])).await;

    let (status, _) = post_json(
        &app,
        "/functions/f/params",
        json!({ "params": [{ "name": "y", "type": "int" }, { "name": "x", "type": "int" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = get_json(&app, "/functions/f/params").await;
    assert_eq!(body["params"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn program_owned_rows_round_trip() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/programs",
        json!({
            "name": "ga",
            "libraries": [{ "name": "vector", "is_stl": true }],
            "global_vars": [{ "name": "rng", "type": "std::mt19937", "args": ["42"] }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
    let var_id = body["global_var_ids"][0].as_i64().unwrap();

    let (status, body) = get_json(&app, &format!("/global-vars/{}", var_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["args"], json!(["42"]));

    let (status, body) = post_json(
        &app,
        "/programs/ga/libraries",
        json!({ "libraries": [{ "name": "vector" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{:?}", body);

    let (status, _) = delete_json(&app, &format!("/global-vars/{}", var_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get_json(&app, "/programs/ga/global-vars").await;
    assert_eq!(body["global_vars"], json!([]));
}

#[tokio::test]
async fn list_filters_combine() {
    let app = test_app();
    create_node(&app, "a", "K_node", "int").await;
    create_node(&app, "b", "K_node", "float").await;
    create_node(&app, "c", "unary_node", "int").await;
    create_function(&app, "pool", "pooling_populations", "int", json!([])).await;
    post_json(&app, "/links/function-node", json!({ "function": "pool", "node": "a" })).await;

    let (status, body) = get_json(&app, "/nodes?type=K_node&gene_type=int").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(body["nodes"][0]["name"], "a");

    let (_, body) = get_json(&app, "/functions?node=a").await;
    assert_eq!(body["functions"][0]["name"], "pool");
    let (_, body) = get_json(&app, "/functions?node=c").await;
    assert_eq!(body["functions"], json!([]));
}

// ---------------------------------------------------------------------------
// Function-node links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attach_then_reattach_is_conflict() {
    let app = test_app();
    create_function(&app, "f1", "fitness", "int", json!([])).await;
    create_node(&app, "n1", "population_node", "int").await;

    let (status, body) =
        post_json(&app, "/links/function-node", json!({ "function": "f1", "node": "n1" })).await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);

    let (status, _) =
        post_json(&app, "/links/function-node", json!({ "function": "f1", "node": "n1" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn gene_type_mismatch_is_unprocessable() {
    let app = test_app();
    create_function(&app, "f", "fitness", "float", json!([])).await;
    create_node(&app, "n", "population_node", "int").await;

    let (status, body) =
        post_json(&app, "/links/function-node", json!({ "function": "f", "node": "n" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn role_is_exclusive_per_node() {
    let app = test_app();
    create_function(&app, "sel_a", "selection", "int", json!([])).await;
    create_function(&app, "sel_b", "selection", "int", json!([])).await;
    create_node(&app, "n", "unary_node", "int").await;

    post_json(&app, "/links/function-node", json!({ "function": "sel_a", "node": "n" })).await;
    let (status, _) =
        post_json(&app, "/links/function-node", json!({ "function": "sel_b", "node": "n" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn restricted_roles_bind_to_node_kinds() {
    let app = test_app();
    create_function(&app, "pool", "pooling_populations", "int", json!([])).await;
    create_function(&app, "start", "start_population", "int", json!([])).await;
    create_node(&app, "k", "K_node", "int").await;
    create_node(&app, "p", "population_node", "int").await;

    let attach = |function: &'static str, node: &'static str| {
        let app = app.clone();
        async move {
            post_json(&app, "/links/function-node", json!({ "function": function, "node": node }))
                .await
                .0
        }
    };
    assert_eq!(attach("pool", "p").await, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(attach("start", "k").await, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(attach("pool", "k").await, StatusCode::OK);
    assert_eq!(attach("start", "p").await, StatusCode::OK);
}

#[tokio::test]
async fn args_require_matching_arity() {
    let app = test_app();
    create_function(
        &app,
        "cross",
        "crossingover",
        "int",
        json!([{ "name": "a", "type": "int" }, { "name": "b", "type": "int" }]),
    )
    .await;
    create_node(&app, "n", "unary_node", "int").await;

    let (status, body) =
        post_json(&app, "/links/function-node", json!({ "function": "cross", "node": "n" })).await;
    assert_eq!(status, StatusCode::OK);
    let link = body["id"].as_i64().unwrap();

    let (status, _) = post_json(
        &app,
        &format!("/links/function-node/{}/args", link),
        json!({ "args": ["1"] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(
        &app,
        &format!("/links/function-node/{}/args", link),
        json!({ "args": ["1", "2"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, &format!("/links/function-node/{}/args", link)).await;
    let args: Vec<&str> = body["args"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["arg"].as_str().unwrap())
        .collect();
    assert_eq!(args, vec!["1", "2"]);
}

#[tokio::test]
async fn args_are_cleared_before_params_change() {
    let app = test_app();
    create_function(&app, "mut", "mutation", "int", json!([{ "name": "rate", "type": "float" }]))
        .await;
    create_node(&app, "n", "unary_node", "int").await;
    let (_, body) = post_json(
        &app,
        "/links/function-node",
        json!({ "function": "mut", "node": "n", "args": ["0.1"] }),
    )
    .await;
    let link = body["id"].as_i64().unwrap();
    let args_path = format!("/links/function-node/{}/args", link);

    let (status, body) = post_json(
        &app,
        "/functions/mut/params",
        json!({ "params": [{ "name": "seed", "type": "int" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["kind"], "function_param");
    let (status, _) = delete_json(&app, "/functions/mut/params").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = delete_json(&app, &args_path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (status, _) = post_json(
        &app,
        "/functions/mut/params",
        json!({ "params": [{ "name": "seed", "type": "int" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, &args_path, json!({ "args": ["0.2", "7"] })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, &args_path).await;
    assert_eq!(body["args"].as_array().unwrap().len(), 2);

    let (status, _) = delete_json(&app, "/links/function-node/999/args").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detach_pair_and_bulk() {
    let app = test_app();
    create_function(&app, "f", "any", "int", json!([])).await;
    create_function(&app, "g", "fitness", "int", json!([])).await;
    create_node(&app, "n", "unary_node", "int").await;
    post_json(&app, "/links/function-node", json!({ "function": "f", "node": "n" })).await;
    post_json(&app, "/links/function-node", json!({ "function": "g", "node": "n" })).await;

    let (status, _) = delete_json(&app, "/links/function-node").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = delete_json(&app, "/links/function-node?function=f&node=n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (status, _) = delete_json(&app, "/links/function-node?function=f&node=n").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = delete_json(&app, "/links/function-node?node=n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
}

// ---------------------------------------------------------------------------
// Node-graph trees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_root_is_conflict() {
    let app = test_app();
    create_node(&app, "n", "population_node", "int").await;
    create_graph(&app, "g1").await;

    let (status, _) = place(&app, "a", "n", "g1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = place(&app, "b", "n", "g1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_root_removes_chain() {
    let app = test_app();
    create_node(&app, "n", "population_node", "int").await;
    create_graph(&app, "g").await;
    let (_, body) = place(&app, "A", "n", "g", None).await;
    let root = body["id"].as_i64().unwrap();
    place(&app, "B", "n", "g", Some("A")).await;
    let (status, _) = place(&app, "C", "n", "g", Some("B")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = delete_json(&app, &format!("/links/node-graph/{}", root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 3);

    let (_, body) = get_json(&app, "/links/node-graph?graph=g").await;
    assert_eq!(body["node_graphs"], json!([]));
}

#[tokio::test]
async fn unknown_parent_name_is_not_found() {
    let app = test_app();
    create_node(&app, "n", "population_node", "int").await;
    create_graph(&app, "g").await;
    place(&app, "A", "n", "g", None).await;

    let (status, body) = place(&app, "B", "n", "g", Some("nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["details"]["kind"], "node_graph");
}

#[tokio::test]
async fn graph_compose_lists_edges() {
    let app = test_app();
    create_function(&app, "fit", "fitness", "int", json!([])).await;
    create_node(&app, "top", "population_node", "int").await;
    create_node(&app, "leaf", "unary_node", "int").await;
    post_json(&app, "/links/function-node", json!({ "function": "fit", "node": "top", "args": [] }))
        .await;
    create_graph(&app, "g").await;
    place(&app, "A", "top", "g", None).await;
    place(&app, "B", "leaf", "g", Some("A")).await;

    let (status, body) = get_json(&app, "/graphs/g/compose").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["edges"],
        json!([
            { "id": body["edges"][0]["id"], "name": "A", "parent": null, "node": "top" },
            { "id": body["edges"][1]["id"], "name": "B", "parent": "A", "node": "leaf" }
        ])
    );
    assert_eq!(body["nodes"][0]["functions"][0]["name"], "fit");

    let (_, detail) = get_json(&app, "/graphs/g").await;
    assert_eq!(detail["node_ids"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Programs and cascades
// ---------------------------------------------------------------------------

#[tokio::test]
async fn program_compose_nests_linked_graphs() {
    let app = test_app();
    post_json(&app, "/programs", json!({ "name": "p" })).await;
    create_node(&app, "n", "population_node", "int").await;
    create_graph(&app, "g").await;
    place(&app, "root", "n", "g", None).await;

    let (status, _) =
        post_json(&app, "/links/program-graph", json!({ "program": "p", "graph": "g" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        post_json(&app, "/links/program-graph", json!({ "program": "p", "graph": "g" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = get_json(&app, "/programs/p/compose").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["graphs"][0]["name"], "g");
    assert_eq!(body["graphs"][0]["edges"][0]["name"], "root");

    let (_, body) = get_json(&app, "/programs?graph=g").await;
    assert_eq!(body["programs"][0]["name"], "p");
}

#[tokio::test]
async fn deleting_function_removes_params_and_links() {
    let app = test_app();
    create_function(
        &app,
        "f",
        "mutation",
        "int",
        json!([{ "name": "rate", "type": "double" }]),
    )
    .await;
    create_node(&app, "n", "unary_node", "int").await;
    post_json(
        &app,
        "/links/function-node",
        json!({ "function": "f", "node": "n", "args": ["0.1"] }),
    )
    .await;

    let (status, _) = delete_json(&app, "/functions/f").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/links/function-node?node=n").await;
    assert_eq!(body["links"], json!([]));
    let (_, body) = get_json(&app, "/nodes/n").await;
    assert_eq!(body["function_ids"], json!([]));
    let (status, _) = get_json(&app, "/functions/f").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_graph_keeps_program() {
    let app = test_app();
    post_json(&app, "/programs", json!({ "name": "p" })).await;
    create_node(&app, "n", "population_node", "int").await;
    create_graph(&app, "g").await;
    place(&app, "A", "n", "g", None).await;
    place(&app, "B", "n", "g", Some("A")).await;
    post_json(&app, "/links/program-graph", json!({ "program": "p", "graph": "g" })).await;

    let (status, _) = delete_json(&app, "/graphs/g").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_json(&app, "/programs/p").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["graph_ids"], json!([]));
    let (_, body) = get_json(&app, "/nodes/n").await;
    assert_eq!(body["graph_ids"], json!([]));
}

#[tokio::test]
async fn catalog_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    let db_path = db_path.to_str().unwrap();

    let app = build_router(AppState::new(db_path).unwrap());
    create_node(&app, "n", "K_node", "int").await;
    drop(app);

    let app = build_router(AppState::new(db_path).unwrap());
    let (status, body) = get_json(&app, "/nodes/n").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "K_node");
}
