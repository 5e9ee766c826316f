//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections use the service's error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
