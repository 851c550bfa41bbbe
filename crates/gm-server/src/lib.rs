//! HTTP/JSON API server for the genetic-method catalog.
//!
//! Hosts the [`service::CatalogService`] (the association manager, integrity
//! checks, composition and cascade deletion) and exposes it over a REST API.
//! This crate contains the service, server framework, API schema types,
//! error handling, configuration and route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
