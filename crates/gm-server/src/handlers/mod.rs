//! HTTP handler modules for the catalog API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! service lock, delegate to [`CatalogService`](crate::service::CatalogService),
//! and return JSON responses. No business logic lives in handlers.

pub mod functions;
pub mod graphs;
pub mod links;
pub mod nodes;
pub mod programs;
