//! Webhook module for validating admission requests.
//!
//! Defines the capability contract between a hosting transport and a
//! validating decision engine, plus the axum/TLS server that hosts a hook.

mod server;

use async_trait::async_trait;
use kube::Client;
use kube::core::admission::AdmissionRequest;
use kube::core::{DynamicObject, GroupVersionResource};

use crate::engine::Verdict;

pub use server::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, create_webhook_router,
    run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionResponse, AdmissionReview, Operation};

/// Contract between a hosting transport and a validating decision engine.
///
/// The transport calls `initialize` exactly once before accepting reviews and
/// routes reviews for the declared resource to `validate`. `validate` must
/// stay well-formed even when called before initialization completes: it
/// rejects rather than panics.
#[async_trait]
pub trait AdmissionHook: Send + Sync {
    /// The group/version/resource tuple this hook intercepts, plus the
    /// singular resource name. Static; used by the host for routing only.
    fn validating_resource(&self) -> (GroupVersionResource, &'static str);

    /// Construct backend clients from the cluster connection and flip the
    /// hook to ready.
    async fn initialize(&self, client: Client);

    /// Decide one admission request, always yielding exactly one verdict.
    async fn validate(&self, request: &AdmissionRequest<DynamicObject>) -> Verdict;
}
