// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frelay_wire::{ErrorResource, StackFrame};
use tracing::error;

// ---------------------------------------------------------------------------
// Fault taxonomy
// ---------------------------------------------------------------------------

/// Broad classification of a server-side fault, consumed by the status
/// mapping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The caller lacks the permissions for the attempted operation.
    AccessDenied,
    /// Any other fault that escaped request handling.
    Unhandled,
}

/// An error that can cross the transport boundary.
///
/// Implementors expose the pieces the translator stamps into an
/// [`ErrorResource`]: a wire identity, an optional message, the captured
/// frames, and the taxonomy bucket used for status mapping.
///
/// ```
/// use frelay_server::Fault;
/// use frelay_wire::{capture_frames, class_name_of, StackFrame};
///
/// #[derive(Debug)]
/// struct QuotaExceeded {
///     frames: Vec<StackFrame>,
/// }
///
/// impl QuotaExceeded {
///     fn new() -> Self {
///         Self { frames: capture_frames() }
///     }
/// }
///
/// impl std::fmt::Display for QuotaExceeded {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("monthly quota exceeded")
///     }
/// }
///
/// impl std::error::Error for QuotaExceeded {}
///
/// impl Fault for QuotaExceeded {
///     fn class_name(&self) -> String {
///         class_name_of::<Self>()
///     }
///
///     fn frames(&self) -> Vec<StackFrame> {
///         self.frames.clone()
///     }
/// }
/// # let _ = QuotaExceeded::new();
/// ```
pub trait Fault: std::error::Error + Send + Sync {
    /// Fully-qualified name of the concrete fault type; becomes the wire
    /// identity the client resolves against its registry. Use
    /// [`frelay_wire::class_name_of`].
    fn class_name(&self) -> String;

    /// Taxonomy bucket fed to the status policy.
    fn kind(&self) -> FaultKind {
        FaultKind::Unhandled
    }

    /// Message carried on the wire. `None` travels as a null
    /// `errorMessage`.
    fn message(&self) -> Option<String> {
        Some(self.to_string())
    }

    /// Frames captured when the fault was raised, innermost first.
    fn frames(&self) -> Vec<StackFrame> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Status policy
// ---------------------------------------------------------------------------

/// Maps a fault's taxonomy bucket to the HTTP status the response carries.
pub type StatusPolicy = Box<dyn Fn(FaultKind) -> StatusCode + Send + Sync>;

/// The default two-bucket policy: access-denied faults answer 401, every
/// other fault answers 400.
pub fn default_status_policy(kind: FaultKind) -> StatusCode {
    match kind {
        FaultKind::AccessDenied => StatusCode::UNAUTHORIZED,
        FaultKind::Unhandled => StatusCode::BAD_REQUEST,
    }
}

// ---------------------------------------------------------------------------
// FaultTranslator
// ---------------------------------------------------------------------------

/// Converts faults escaping request handling into transport-safe responses.
///
/// Translation always succeeds: any fault reaching the boundary produces a
/// JSON [`ErrorResource`] body under the status chosen by the policy, and
/// the fault is logged server-side before the response leaves.
pub struct FaultTranslator {
    policy: StatusPolicy,
}

impl FaultTranslator {
    /// Translator with the default two-bucket status policy.
    pub fn new() -> Self {
        Self::with_policy(default_status_policy)
    }

    /// Translator with a caller-supplied status policy.
    pub fn with_policy<P>(policy: P) -> Self
    where
        P: Fn(FaultKind) -> StatusCode + Send + Sync + 'static,
    {
        Self {
            policy: Box::new(policy),
        }
    }

    /// Convert a live fault into a response-ready [`TranslatedFault`].
    pub fn translate<F: Fault + ?Sized>(&self, fault: &F) -> TranslatedFault {
        let kind = fault.kind();
        let status = (self.policy)(kind);
        let resource = ErrorResource::new(
            status.as_u16(),
            fault.class_name(),
            fault.message(),
            fault.frames(),
        );
        match kind {
            FaultKind::AccessDenied => error!(
                class = %resource.error_class_name,
                status = status.as_u16(),
                "permission denied: {fault}"
            ),
            FaultKind::Unhandled => error!(
                class = %resource.error_class_name,
                status = status.as_u16(),
                "unhandled server fault: {fault}"
            ),
        }
        TranslatedFault { status, resource }
    }
}

impl Default for FaultTranslator {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TranslatedFault
// ---------------------------------------------------------------------------

/// A fault already mapped to its wire form.
///
/// Returned as the error arm of axum handlers; rendering it produces the
/// JSON error body with `Content-Type: application/json` and the status
/// chosen by the policy, so a fault can never leave the boundary
/// unconverted.
#[derive(Debug, Clone)]
pub struct TranslatedFault {
    /// Status the response will carry; always equals `resource.code`.
    pub status: StatusCode,
    /// The wire body.
    pub resource: ErrorResource,
}

impl IntoResponse for TranslatedFault {
    fn into_response(self) -> Response {
        (self.status, Json(self.resource)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
