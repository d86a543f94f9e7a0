// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use frelay_client::{
    CauseKind, CauseRegistry, ClientError, ErrorDecoder, ReconstructedCause, RelayClient,
    RemoteCallError,
};
pub use frelay_server::{
    Fault, FaultKind, FaultTranslator, StatusPolicy, TranslatedFault, default_status_policy,
};
pub use frelay_wire::{ErrorResource, StackFrame, capture_frames, class_name_of};
