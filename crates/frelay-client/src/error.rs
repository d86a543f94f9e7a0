// SPDX-License-Identifier: MIT OR Apache-2.0
//! The client-facing error raised for every remote application failure,
//! plus the envelope distinguishing it from transport and decode failures.

use crate::registry::{CauseRegistry, ReconstructedCause};
use frelay_wire::{ErrorResource, StackFrame};
use std::error::Error;
use std::fmt;
use thiserror::Error as ThisError;

// ---------------------------------------------------------------------------
// RemoteCallError
// ---------------------------------------------------------------------------

/// The single error raised to callers when a remote call failed with a
/// server-side application error.
///
/// Its cause is always the [`ReconstructedCause`] built from the wire
/// resource — typed when the original error type is registered locally,
/// opaque otherwise — so `source()` never returns `None`.
#[derive(Debug)]
pub struct RemoteCallError {
    message: String,
    frames: Vec<StackFrame>,
    cause: ReconstructedCause,
}

impl RemoteCallError {
    /// Shape (a): caller-supplied context message, cause rebuilt from the
    /// resource.
    pub fn new(
        message: impl Into<String>,
        resource: &ErrorResource,
        registry: &CauseRegistry,
    ) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
            cause: registry.reconstruct(resource),
        }
    }

    /// Shape (b): message synthesized from the resource, and this error's
    /// *own* frames set to the transmitted ones. Used when no wrapping
    /// context message is needed.
    pub fn from_resource(resource: &ErrorResource, registry: &CauseRegistry) -> Self {
        Self {
            message: format!(
                "{} error raised by rest client: {}",
                resource.error_class_name,
                resource.error_message.as_deref().unwrap_or("")
            ),
            frames: resource.stack_trace.clone(),
            cause: registry.reconstruct(resource),
        }
    }

    /// The reconstructed cause. Also reachable through [`Error::source`].
    pub fn cause(&self) -> &ReconstructedCause {
        &self.cause
    }

    /// This error's own frames; empty unless built with
    /// [`RemoteCallError::from_resource`]. The cause is the holder of the
    /// transmitted trace in both shapes.
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }
}

impl fmt::Display for RemoteCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for RemoteCallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

/// Everything a relayed call can fail with.
///
/// `Remote` is the normal outcome for an error-series response;
/// `MalformedErrorBody` signals a response that claimed to be an error but
/// did not carry a usable [`ErrorResource`] (an I/O-kind condition, not a
/// remote application error); `Transport` covers connection failures and
/// timeouts, which bypass the resource pipeline entirely.
#[derive(Debug, ThisError)]
pub enum ClientError {
    /// The error body could not be decoded into an [`ErrorResource`].
    #[error("error reading the error response body (status {status})")]
    MalformedErrorBody {
        /// Status the response carried.
        status: u16,
        /// The decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a translated application error.
    #[error(transparent)]
    Remote(#[from] RemoteCallError),

    /// The transport failed before a response body could be examined.
    #[error("transport failure")]
    Transport(#[from] reqwest::Error),
}
