/// Middleware modules for the API server
///
/// - `request_context`: Correlation ID and actor resolution

pub mod request_context;
