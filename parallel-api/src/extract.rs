/// Extractors whose rejections use the API error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// `Json` body; malformed input is `BAD_USER_INPUT`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string; malformed input is `BAD_USER_INPUT`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters; malformed IDs are `BAD_USER_INPUT`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
