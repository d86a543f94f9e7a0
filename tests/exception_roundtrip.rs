// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end transport tests: a real axum server answering over a loopback
//! socket, a real reqwest-backed client decoding its error bodies.

use axum::routing::get;
use axum::{Json, Router};
use fault_relay::{
    CauseRegistry, ClientError, Fault, FaultKind, FaultTranslator, RelayClient, StackFrame,
    TranslatedFault, capture_frames, class_name_of,
};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

// ── Faults shared by both type spaces ───────────────────────────────

#[derive(Debug, Default, Error)]
#[error("testing an exception serialization")]
struct SerializationProbe {
    frames: Vec<StackFrame>,
}

impl SerializationProbe {
    fn raise() -> Self {
        Self {
            frames: capture_frames(),
        }
    }
}

impl Fault for SerializationProbe {
    fn class_name(&self) -> String {
        class_name_of::<Self>()
    }

    fn frames(&self) -> Vec<StackFrame> {
        self.frames.clone()
    }
}

#[derive(Debug, Default, Error)]
#[error("nobody may list payouts")]
struct PayoutForbidden;

#[derive(Debug, Default, Error)]
#[error("ledger entry rejected")]
struct EntryRejected;

fn ledger_frames() -> Vec<StackFrame> {
    vec![
        StackFrame::new("ledger::postings", "append", Some("src/postings.rs".into()), 88),
        StackFrame::new("ledger::api", "post_entry", Some("src/api.rs".into()), 31),
        StackFrame::new("ledger::http", "dispatch", None, -1),
    ]
}

impl Fault for EntryRejected {
    fn class_name(&self) -> String {
        class_name_of::<Self>()
    }

    fn frames(&self) -> Vec<StackFrame> {
        ledger_frames()
    }
}

impl Fault for PayoutForbidden {
    fn class_name(&self) -> String {
        class_name_of::<Self>()
    }

    fn kind(&self) -> FaultKind {
        FaultKind::AccessDenied
    }
}

// ── Server wiring ───────────────────────────────────────────────────

type HandlerResult = Result<Json<serde_json::Value>, TranslatedFault>;

fn relay_app() -> Router {
    let translator = Arc::new(FaultTranslator::new());
    let probe = translator.clone();
    let payouts = translator.clone();
    Router::new()
        .route(
            "/probe",
            get(move || {
                let translator = probe.clone();
                async move {
                    let outcome: HandlerResult =
                        Err(translator.translate(&SerializationProbe::raise()));
                    outcome
                }
            }),
        )
        .route(
            "/payouts",
            get(move || {
                let translator = payouts.clone();
                async move {
                    let outcome: HandlerResult = Err(translator.translate(&PayoutForbidden));
                    outcome
                }
            }),
        )
        .route(
            "/ledger",
            get(|| async {
                let outcome: HandlerResult =
                    Err(FaultTranslator::new().translate(&EntryRejected));
                outcome
            }),
        )
        .route(
            "/ok",
            get(|| async { Json(serde_json::json!({ "status": "ok" })) }),
        )
}

async fn serve(app: Router) -> SocketAddr {
    // Surfaces the boundary logs when RUST_LOG is set; idempotent across tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn probe_aware_client() -> RelayClient {
    let mut registry = CauseRegistry::new();
    registry.register::<SerializationProbe>();
    RelayClient::new(Arc::new(registry))
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn server_fault_reaches_the_caller_with_its_type_and_message() {
    let addr = serve(relay_app()).await;

    let outcome = probe_aware_client()
        .get_json::<serde_json::Value>(&format!("http://{addr}/probe"))
        .await;

    let ClientError::Remote(err) = outcome.unwrap_err() else {
        panic!("expected a remote error");
    };

    // The causal chain carries either the original type or an opaque
    // fallback; in both cases the diagnostic message survives the wire.
    let cause = err.cause();
    assert!(cause.to_string().contains("testing an exception serialization"));
    assert!(cause.typed::<SerializationProbe>().is_some());

    // Walking with plain std machinery reaches the rebuilt original.
    let mut chain: &dyn Error = &err;
    let mut found = false;
    while let Some(next) = chain.source() {
        if next.downcast_ref::<SerializationProbe>().is_some() {
            found = true;
        }
        chain = next;
    }
    assert!(found);
}

#[tokio::test]
async fn unregistered_client_still_gets_full_diagnostics() {
    let addr = serve(relay_app()).await;

    // A client with an empty registry models a desynchronized type space.
    let client = RelayClient::new(Arc::new(CauseRegistry::new()));
    let outcome = client
        .get_json::<serde_json::Value>(&format!("http://{addr}/probe"))
        .await;

    let ClientError::Remote(err) = outcome.unwrap_err() else {
        panic!("expected a remote error");
    };
    assert!(!err.cause().is_typed());
    assert!(err.cause().to_string().contains("400"));
    assert!(err.cause().to_string().contains("testing an exception serialization"));
}

#[tokio::test]
async fn access_denied_travels_as_401() {
    let addr = serve(relay_app()).await;

    let outcome = probe_aware_client()
        .get_json::<serde_json::Value>(&format!("http://{addr}/payouts"))
        .await;

    let ClientError::Remote(err) = outcome.unwrap_err() else {
        panic!("expected a remote error");
    };
    assert!(err.cause().to_string().starts_with("HttpStatus:401"));
    assert!(err.cause().class_name().ends_with("PayoutForbidden"));
}

#[tokio::test]
async fn healthy_route_passes_through_untouched() {
    let addr = serve(relay_app()).await;

    let value = probe_aware_client()
        .get_json::<serde_json::Value>(&format!("http://{addr}/ok"))
        .await
        .unwrap();
    assert_eq!(value["status"], "ok");
}

#[tokio::test]
async fn frames_survive_the_full_trip_in_order() {
    let addr = serve(relay_app()).await;

    let outcome = probe_aware_client()
        .get_json::<serde_json::Value>(&format!("http://{addr}/ledger"))
        .await;

    let ClientError::Remote(err) = outcome.unwrap_err() else {
        panic!("expected a remote error");
    };
    assert_eq!(err.cause().frames(), ledger_frames());
}
