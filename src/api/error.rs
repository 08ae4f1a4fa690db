use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::clients::ClientError;
use crate::gateway::GatewayError;

use super::types::ErrorBody;

#[derive(Debug)]
pub enum ApiError {
    InvalidArgument(String),

    BackendUnavailable { service: String, message: String },

    BackendTimeout { service: String },

    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::BackendUnavailable { service, message } => {
                write!(f, "{} unavailable: {}", service, message)
            }
            Self::BackendTimeout { service } => write!(f, "{} timed out", service),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::BackendUnavailable { .. } => "BackendUnavailable",
            Self::BackendTimeout { .. } => "BackendTimeout",
            Self::Internal(_) => "Internal",
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::BackendUnavailable { service, message } => {
                tracing::warn!("{} error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} is unavailable", service),
                )
            }
            Self::BackendTimeout { service } => {
                tracing::warn!("{} timed out", service);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("{} did not respond in time", service),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody::new(self.kind(), message);
        (status, Json(body)).into_response()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unavailable {
                service,
                status,
                message,
            } => Self::BackendUnavailable {
                service: service.to_string(),
                message: match status {
                    Some(status) => format!("{status}: {message}"),
                    None => message,
                },
            },
            ClientError::Timeout { service } => Self::BackendTimeout {
                service: service.to_string(),
            },
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            GatewayError::Backend(client) => client.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(ApiError::invalid("x").kind(), "InvalidArgument");
        assert_eq!(
            ApiError::BackendTimeout {
                service: "search backend".to_string()
            }
            .kind(),
            "BackendTimeout"
        );
    }

    #[test]
    fn test_client_timeout_maps_to_backend_timeout() {
        let err: ApiError = ClientError::Timeout {
            service: "scrape backend",
        }
        .into();
        assert_eq!(err.kind(), "BackendTimeout");
    }

    #[test]
    fn test_gateway_invalid_argument_passes_through() {
        let err: ApiError = GatewayError::InvalidArgument("bad".to_string()).into();
        assert_eq!(err.kind(), "InvalidArgument");
    }
}
