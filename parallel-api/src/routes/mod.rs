/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, signin, logout and the current user
/// - `uploads`: Asset upload
/// - `workspaces`: Workspaces and invite codes
/// - `members`: Workspace membership
/// - `projects`: Projects
/// - `tasks`: Tasks, bulk reorder and column rebalance
/// - `analytics`: Month-over-month task statistics

pub mod analytics;
pub mod auth;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod uploads;
pub mod workspaces;
