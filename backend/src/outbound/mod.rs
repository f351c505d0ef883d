//! Outbound adapters implementing the domain ports against real
//! infrastructure: identity providers, the image API, and PostgreSQL.

pub mod images;
pub mod oauth;
pub mod persistence;
