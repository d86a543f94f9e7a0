// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed cause lookup with safe opaque fallback.
//!
//! The server names the original error type on the wire; this registry maps
//! those names back to local zero-argument constructors. Reconstruction
//! never fails: when the name is unknown or its factory cannot produce a
//! value, the result degrades to an opaque cause that keeps the full
//! diagnostic text and frames — only type identity is lost.

use frelay_wire::{ErrorResource, StackFrame, class_name_of};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use tracing::warn;

type BoxedCause = Box<dyn Error + Send + Sync + 'static>;
type CauseFactory = Box<dyn Fn() -> Option<BoxedCause> + Send + Sync>;

// ---------------------------------------------------------------------------
// CauseRegistry
// ---------------------------------------------------------------------------

/// Registry of wire class names to zero-argument cause factories.
///
/// Populate it once at startup, then share it read-only (typically behind an
/// `Arc`) across every call; reconstruction never mutates the registry, so
/// concurrent decoding needs no locking.
#[derive(Default)]
pub struct CauseRegistry {
    factories: HashMap<String, CauseFactory>,
}

impl CauseRegistry {
    /// Empty registry. Every reconstruction falls back to an opaque cause
    /// until types are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` under its own fully-qualified type name.
    ///
    /// When the server side raises the same Rust type, the wire name
    /// matches and decoding yields a cause of type `E`.
    pub fn register<E>(&mut self) -> &mut Self
    where
        E: Error + Default + Send + Sync + 'static,
    {
        self.register_as::<E>(class_name_of::<E>())
    }

    /// Register `E` under an explicit wire name, for servers whose type
    /// space names the error differently.
    pub fn register_as<E>(&mut self, class_name: impl Into<String>) -> &mut Self
    where
        E: Error + Default + Send + Sync + 'static,
    {
        self.register_factory(class_name, || {
            let cause: BoxedCause = Box::new(E::default());
            Some(cause)
        })
    }

    /// Register a fallible factory under a wire name.
    ///
    /// A factory returning `None` models a type without a usable
    /// zero-argument constructor; reconstruction then takes the opaque
    /// fallback path instead of erroring.
    pub fn register_factory<F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Option<BoxedCause> + Send + Sync + 'static,
    {
        self.factories.insert(class_name.into(), Box::new(factory));
        self
    }

    /// Whether a wire name has a registered factory.
    pub fn contains(&self, class_name: &str) -> bool {
        self.factories.contains_key(class_name)
    }

    /// Number of registered wire names.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Rebuild a throwable cause from a decoded [`ErrorResource`].
    ///
    /// Never fails. The typed path resolves the wire name, invokes the
    /// factory and yields a cause whose chain carries a value of the
    /// original type; any miss degrades to the opaque fallback with the
    /// same message and frames, logged at warn level with the reason.
    pub fn reconstruct(&self, resource: &ErrorResource) -> ReconstructedCause {
        let message = format!(
            "HttpStatus:{} - {}",
            resource.code,
            resource.error_message.as_deref().unwrap_or("")
        );
        let kind = match self.factories.get(&resource.error_class_name) {
            Some(factory) => match factory() {
                Some(cause) => CauseKind::Known(cause),
                None => {
                    warn!(
                        class = %resource.error_class_name,
                        "registered factory could not rebuild the typed cause"
                    );
                    CauseKind::Opaque
                }
            },
            None => {
                warn!(
                    class = %resource.error_class_name,
                    "no registered cause for remote error class"
                );
                CauseKind::Opaque
            }
        };
        ReconstructedCause {
            class_name: resource.error_class_name.clone(),
            message,
            frames: resource.stack_trace.clone(),
            kind,
        }
    }
}

impl fmt::Debug for CauseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CauseRegistry").field("classes", &names).finish()
    }
}

// ---------------------------------------------------------------------------
// ReconstructedCause
// ---------------------------------------------------------------------------

/// Whether reconstruction recovered the original type.
#[derive(Debug)]
pub enum CauseKind {
    /// The wire name resolved locally; the boxed value has the original
    /// runtime type and is reachable through [`Error::source`].
    Known(Box<dyn Error + Send + Sync + 'static>),
    /// The type could not be rebuilt; diagnostics are carried without type
    /// identity.
    Opaque,
}

/// The throwable produced from an [`ErrorResource`].
///
/// Both variants expose the same diagnostics — a message of the form
/// `HttpStatus:<code> - <errorMessage>` and the remote frames in wire order.
/// Only the typed path additionally offers the original runtime type as its
/// source.
#[derive(Debug)]
pub struct ReconstructedCause {
    class_name: String,
    message: String,
    frames: Vec<StackFrame>,
    kind: CauseKind,
}

impl ReconstructedCause {
    /// Wire name of the original error type.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Remote frames, innermost first, exactly as transmitted.
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Whether the original type was rebuilt.
    pub fn is_typed(&self) -> bool {
        matches!(self.kind, CauseKind::Known(_))
    }

    /// Which path reconstruction took.
    pub fn kind(&self) -> &CauseKind {
        &self.kind
    }

    /// The rebuilt value as the original type, when reconstruction
    /// recovered it.
    pub fn typed<E: Error + 'static>(&self) -> Option<&E> {
        match &self.kind {
            CauseKind::Known(cause) => cause.downcast_ref::<E>(),
            CauseKind::Opaque => None,
        }
    }
}

impl fmt::Display for ReconstructedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ReconstructedCause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            CauseKind::Known(cause) => Some(cause.as_ref() as &(dyn Error + 'static)),
            CauseKind::Opaque => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
