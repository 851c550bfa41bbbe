//! Router assembly for the catalog HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{delete, get};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. Entity keys in paths are an
/// integer id or a unique name.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Functions
        .route(
            "/functions",
            get(handlers::functions::list_functions).post(handlers::functions::create_function),
        )
        .route(
            "/functions/{key}",
            get(handlers::functions::get_function).delete(handlers::functions::delete_function),
        )
        .route(
            "/functions/{key}/params",
            get(handlers::functions::list_params)
                .post(handlers::functions::post_params)
                .delete(handlers::functions::delete_params),
        )
        // Nodes
        .route(
            "/nodes",
            get(handlers::nodes::list_nodes).post(handlers::nodes::create_node),
        )
        .route(
            "/nodes/{key}",
            get(handlers::nodes::get_node).delete(handlers::nodes::delete_node),
        )
        .route("/nodes/{key}/compose", get(handlers::nodes::compose_node))
        // Graphs
        .route(
            "/graphs",
            get(handlers::graphs::list_graphs).post(handlers::graphs::create_graph),
        )
        .route(
            "/graphs/{key}",
            get(handlers::graphs::get_graph).delete(handlers::graphs::delete_graph),
        )
        .route("/graphs/{key}/compose", get(handlers::graphs::compose_graph))
        // Programs
        .route(
            "/programs",
            get(handlers::programs::list_programs).post(handlers::programs::create_program),
        )
        .route(
            "/programs/{key}",
            get(handlers::programs::get_program).delete(handlers::programs::delete_program),
        )
        .route(
            "/programs/{key}/compose",
            get(handlers::programs::compose_program),
        )
        .route(
            "/programs/{key}/libraries",
            get(handlers::programs::list_libraries).post(handlers::programs::post_libraries),
        )
        .route(
            "/programs/{key}/global-vars",
            get(handlers::programs::list_global_vars).post(handlers::programs::post_global_vars),
        )
        .route(
            "/libraries/{id}",
            delete(handlers::programs::delete_library),
        )
        .route(
            "/global-vars/{id}",
            get(handlers::programs::get_global_var).delete(handlers::programs::delete_global_var),
        )
        // Links
        .route(
            "/links/function-node",
            get(handlers::links::list_function_nodes)
                .post(handlers::links::attach_function_node)
                .delete(handlers::links::detach_function_nodes),
        )
        .route(
            "/links/function-node/{id}/args",
            get(handlers::links::get_function_node_args)
                .post(handlers::links::attach_args)
                .delete(handlers::links::detach_args),
        )
        .route(
            "/links/node-graph",
            get(handlers::links::list_node_graphs)
                .post(handlers::links::attach_node_graph)
                .delete(handlers::links::detach_node_graphs),
        )
        .route(
            "/links/node-graph/{id}",
            get(handlers::links::get_node_graph).delete(handlers::links::detach_node_graph),
        )
        .route(
            "/links/program-graph",
            get(handlers::links::list_program_graphs)
                .post(handlers::links::attach_program_graph)
                .delete(handlers::links::detach_program_graphs),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
