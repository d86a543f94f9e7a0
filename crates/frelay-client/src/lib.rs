// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Thin request-execution wrapper installing the decode pipeline.
pub mod client;
/// Error-series detection and error-body decoding.
pub mod decoder;
/// The client-facing error and its decode-outcome envelope.
pub mod error;
/// Typed cause lookup with safe opaque fallback.
pub mod registry;

pub use client::RelayClient;
pub use decoder::ErrorDecoder;
pub use error::{ClientError, RemoteCallError};
pub use registry::{CauseKind, CauseRegistry, ReconstructedCause};
