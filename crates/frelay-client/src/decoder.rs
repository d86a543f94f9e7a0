// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error-series detection and error-body decoding.
//!
//! The decoder is transport-agnostic: it sees only a status and body bytes.
//! For a non-error status it is never consulted; for an error status its
//! two outcomes are a malformed-body failure or a raised
//! [`RemoteCallError`] — it never produces a success value.

use crate::error::{ClientError, RemoteCallError};
use crate::registry::CauseRegistry;
use frelay_wire::ErrorResource;
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::error;

/// Decodes error responses into the client-facing error.
#[derive(Debug, Clone)]
pub struct ErrorDecoder {
    registry: Arc<CauseRegistry>,
}

impl ErrorDecoder {
    /// Decoder reconstructing causes through the given registry.
    pub fn new(registry: Arc<CauseRegistry>) -> Self {
        Self { registry }
    }

    /// Whether a status belongs to the client-error or server-error series.
    ///
    /// Anything else passes through to the caller untouched.
    pub fn is_error_status(status: StatusCode) -> bool {
        status.is_client_error() || status.is_server_error()
    }

    /// Turn an error response into the error the caller will observe.
    ///
    /// The body must deserialize into a usable [`ErrorResource`]; otherwise
    /// the outcome is [`ClientError::MalformedErrorBody`]. A usable resource
    /// has each of its frames logged at error level and always becomes a
    /// [`ClientError::Remote`] whose cause is the reconstructed one.
    pub fn decode(&self, status: StatusCode, body: &[u8]) -> ClientError {
        error!(status = status.as_u16(), "response error");
        let resource: ErrorResource = match serde_json::from_slice(body) {
            Ok(resource) => resource,
            Err(source) => {
                return ClientError::MalformedErrorBody {
                    status: status.as_u16(),
                    source,
                };
            }
        };
        for frame in &resource.stack_trace {
            error!(frame = %frame, "remote frame");
        }
        ClientError::Remote(RemoteCallError::new(
            "an error occurred while contacting the rest server",
            &resource,
            &self.registry,
        ))
    }
}
