//! HTTP interface module.

pub mod handlers;
pub mod monitoring;
pub mod routes;
