//! # Parallel API Server Library
//!
//! HTTP transport for the Parallel project tracker.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors with API-shaped rejections
//! - `middleware`: Request context
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
