use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Anything other than POST on the describe endpoint
    #[error("Method not allowed")]
    InvalidMethod,

    /// Zero-length request body
    #[error("No image data received")]
    EmptyPayload,

    /// The body could not be read off the wire (too large, aborted upload)
    #[error("Failed to read image data")]
    PayloadRead { status: StatusCode },

    /// The transient file could not be written
    #[error("Failed to save image")]
    StorageWriteFailure(#[source] std::io::Error),

    /// The transient file was gone by the time the service looked for it
    #[error("Image file not found")]
    SourceNotFound,

    /// Connection, TLS or timeout failure reaching the vision API
    #[error("Transport error: {0}")]
    TransportFailure(String),

    /// The vision API answered with something other than 200
    #[error("API request failed (HTTP {0})")]
    UpstreamStatusFailure(u16),

    /// The vision API body had no `choices[0].message.content`
    #[error("Could not parse API response")]
    ResponseParseFailure,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    /// Status code table. Only request validation and storage problems get a
    /// distinct status; failures inside the description service are reported
    /// with 200 and callers branch on the `error` field.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            Error::EmptyPayload => StatusCode::BAD_REQUEST,
            Error::PayloadRead { status } => *status,
            Error::StorageWriteFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::SourceNotFound
            | Error::TransportFailure(_)
            | Error::UpstreamStatusFailure(_)
            | Error::ResponseParseFailure => StatusCode::OK,
        }
    }

    /// The string placed in the `error` field of the response body.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Error::StorageWriteFailure(source) => {
                tracing::error!(error = %source, "could not write transient image file");
            }
            _ => {
                tracing::warn!(status = status.as_u16(), error = %self, "describe request failed")
            }
        }
        (status, Json(ErrorBody { error: self.user_message() })).into_response()
    }
}
