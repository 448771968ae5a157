//! Middleware layers for the API server.

pub mod cors;
