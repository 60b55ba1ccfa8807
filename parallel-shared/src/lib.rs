//! # Parallel Shared Library
//!
//! This crate contains the domain core of the Parallel project tracker:
//! persistence models, authentication, workspace-scoped authorization,
//! the task board ordering engine and the analytics aggregator.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `board`: Task position assignment and bulk reordering
//! - `analytics`: Month-over-month task statistics
//! - `services`: Operation layer invoked by the transport
//! - `upload`: Asset store boundary
//! - `db`: Connection pool and migrations
//! - `error`: Common error types

pub mod analytics;
pub mod auth;
pub mod board;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod upload;

/// Current version of the Parallel shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
