//! Admin side of the portfolio: HTTP API, record store, backing services
//! and a typed client.
//!
//! - [`http`] - axum router, handlers, auth, audit and metrics
//! - [`store`] - image and project records on the SQL service
//! - [`services`] - SQL backend and image host abstractions
//! - [`client`] - reqwest client for the API

pub mod client;
pub mod http;
pub mod services;
pub mod store;
