//! The `taskhive` library crate.
//!
//! Contains the domain models, token-based session authentication,
//! ownership-scoped task storage, routing configuration, and error handling
//! for the TaskHive API. The binary (`main.rs`) uses it to construct and run
//! the HTTP server.

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod media;
pub mod models;
pub mod patch;
pub mod routes;
pub mod store;
