// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

// ---------------------------------------------------------------------------
// StackFrame
// ---------------------------------------------------------------------------

/// One reconstructed call-stack entry.
///
/// Frames are immutable once created and travel the wire in camelCase:
/// `{"declaringClass", "methodName", "fileName", "lineNumber"}`. A negative
/// `line_number` denotes an unknown or native location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Module path (or class) that declares the executing function.
    pub declaring_class: String,
    /// Name of the executing function.
    pub method_name: String,
    /// Source file, when debug information is available.
    pub file_name: Option<String>,
    /// 1-based source line, negative when unknown.
    pub line_number: i32,
}

impl StackFrame {
    /// Create a frame from its four parts.
    pub fn new(
        declaring_class: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<String>,
        line_number: i32,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            method_name: method_name.into(),
            file_name,
            line_number,
        }
    }
}

impl fmt::Display for StackFrame {
    /// Renders the classic `declaring.method(file:line)` shape used when
    /// logging remote frames one by one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_class, self.method_name)?;
        match (&self.file_name, self.line_number) {
            (Some(file), line) if line >= 0 => write!(f, "({file}:{line})"),
            (Some(file), _) => write!(f, "({file})"),
            (None, _) => write!(f, "(Unknown Source)"),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorResource
// ---------------------------------------------------------------------------

/// Transport-safe representation of a server-side error.
///
/// Created fresh for each failed call, serialized once as the JSON error
/// body, deserialized once on the client, consumed by cause reconstruction
/// and then discarded.
///
/// The frame order is preserved end to end, innermost frame first; the
/// sequence may be empty but is never null (an absent `stackTrace` field
/// decodes to an empty vector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResource {
    /// HTTP status the failing server answered with.
    pub code: u16,
    /// Fully-qualified name of the original error type. Never empty on
    /// construction.
    pub error_class_name: String,
    /// Message carried by the original error, when it had one.
    pub error_message: Option<String>,
    /// Frames of the original error, innermost first.
    #[serde(default)]
    pub stack_trace: Vec<StackFrame>,
}

impl ErrorResource {
    /// Build a resource from a live error's parts.
    pub fn new(
        code: u16,
        error_class_name: impl Into<String>,
        error_message: Option<String>,
        stack_trace: Vec<StackFrame>,
    ) -> Self {
        Self {
            code,
            error_class_name: error_class_name.into(),
            error_message,
            stack_trace,
        }
    }
}

// ---------------------------------------------------------------------------
// Type naming and frame capture
// ---------------------------------------------------------------------------

/// Fully-qualified name of a type, used as the wire identity of an error.
///
/// The same helper feeds both sides of the transport: servers stamp it into
/// [`ErrorResource::error_class_name`], clients key their cause registries
/// with it, so a type present in both type spaces resolves to itself.
pub fn class_name_of<T: ?Sized>() -> String {
    std::any::type_name::<T>().to_string()
}

/// Capture the calling thread's stack as wire frames, innermost first.
///
/// Returns an empty vector when the platform cannot produce a backtrace.
/// File and line information is only present in builds carrying debug info.
pub fn capture_frames() -> Vec<StackFrame> {
    let backtrace = Backtrace::force_capture();
    match backtrace.status() {
        BacktraceStatus::Captured => parse_backtrace(&backtrace.to_string()),
        _ => Vec::new(),
    }
}

/// Parse the rendered form of a [`std::backtrace::Backtrace`] into frames.
///
/// The renderer emits one `N: symbol` line per frame, optionally followed by
/// an indented `at path:line:column` line. Frames whose location line is
/// missing or unparsable keep a negative line number.
fn parse_backtrace(rendered: &str) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    let mut lines = rendered.lines().peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        let Some((index, symbol)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let symbol = symbol.trim();

        let mut file_name = None;
        let mut line_number = -1;
        if let Some(location) = lines.peek().map(|l| l.trim_start()) {
            if let Some(rest) = location.strip_prefix("at ") {
                let mut parts = rest.rsplitn(3, ':');
                let _column = parts.next();
                let line_part = parts.next().and_then(|l| l.parse::<i32>().ok());
                if let (Some(line), Some(path)) = (line_part, parts.next()) {
                    line_number = line;
                    file_name = Some(path.to_string());
                }
                lines.next();
            }
        }

        let (declaring, method) = match symbol.rfind("::") {
            Some(split) => (&symbol[..split], &symbol[split + 2..]),
            None => ("", symbol),
        };
        frames.push(StackFrame::new(declaring, method, file_name, line_number));
    }
    frames
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
