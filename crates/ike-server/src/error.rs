//! HTTP error mapping.
//!
//! Every failure leaves the service as an [`ErrorBody`] with a status picked
//! from its [`ErrorKind`].

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ike_core::{ErrorBody, ErrorKind};
use ike_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body rejected by the JSON extractor; keeps the extractor's status.
    #[error("{detail}")]
    MalformedBody { status: StatusCode, detail: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Query(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedBody { .. } => ErrorKind::MalformedRequest,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Query(_) => ErrorKind::QueryFailed,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody { status, .. } => *status,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Query(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl ApiError {
    /// Response for routes that report `success`: the error body with
    /// `success: false`.
    pub fn into_failed_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body.with_success(false))).into_response()
    }

    fn into_parts(self) -> (StatusCode, ErrorBody) {
        let status = self.status();
        let body = ErrorBody::new(self.kind(), self.to_string());

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                kind = ?body.kind,
                error = %body.error,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                kind = ?body.kind,
                error = %body.error,
                "Request rejected"
            );
        }
        (status, body)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match &err {
            GraphError::InvalidConfig(_) | GraphError::InvalidIdentifier { .. } => {
                Self::InvalidInput(err.to_string())
            }
            GraphError::Authentication(_) => Self::Authentication(err.to_string()),
            GraphError::Unavailable(_) => Self::Unavailable(err.to_string()),
            GraphError::EndpointsNotFound { .. } => Self::NotFound(err.to_string()),
            GraphError::Query(_) | GraphError::Serialization(_) => Self::Query(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_mapping() {
        let cases = [
            (
                GraphError::InvalidIdentifier {
                    name: String::new(),
                    reason: "must not be empty",
                },
                StatusCode::BAD_REQUEST,
                ErrorKind::InvalidInput,
            ),
            (
                GraphError::Authentication("bad password".into()),
                StatusCode::UNAUTHORIZED,
                ErrorKind::Authentication,
            ),
            (
                GraphError::Unavailable("connection refused".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Unavailable,
            ),
            (
                GraphError::EndpointsNotFound {
                    source_id: "a".into(),
                    target_id: "b".into(),
                },
                StatusCode::NOT_FOUND,
                ErrorKind::NotFound,
            ),
            (
                GraphError::Serialization("bad column".into()),
                StatusCode::BAD_GATEWAY,
                ErrorKind::QueryFailed,
            ),
        ];

        for (graph_err, status, kind) in cases {
            let api_err = ApiError::from(graph_err);
            assert_eq!(api_err.status(), status);
            assert_eq!(api_err.kind(), kind);
        }
    }

    #[test]
    fn test_failed_response_sets_success_false() {
        let resp = ApiError::Unavailable("refused".into()).into_failed_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_detail_keeps_graph_message() {
        let api_err = ApiError::from(GraphError::Unavailable("connection refused".into()));
        assert_eq!(api_err.to_string(), "Neo4j unavailable: connection refused");
    }
}
