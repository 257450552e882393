//! Admission webhook server.
//!
//! Hosts an [`AdmissionHook`] behind HTTPS and speaks the AdmissionReview
//! protocol on the wire. The server owns serialization and TLS only; every
//! decision comes from the hook.
//!
//! To enable the webhook:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create a ValidatingWebhookConfiguration for the declared resource
//! 3. Mount the TLS certificate secret to the pod at /etc/webhook/certs/

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::Client;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::engine::Verdict;
use crate::health::HealthState;
use crate::webhooks::AdmissionHook;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Errors that can occur when running the webhook server
#[derive(Debug, Error)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Shared state for webhook handlers
pub struct WebhookState {
    pub hook: Arc<dyn AdmissionHook>,
    pub health: Arc<HealthState>,
}

/// Convert a verdict into the wire-level admission response.
///
/// The response always carries the request uid; rejections carry the full
/// failure `Status` (code, reason, message), not just a message string.
pub fn verdict_to_response(
    request: &AdmissionRequest<DynamicObject>,
    verdict: &Verdict,
) -> AdmissionResponse {
    let mut response = AdmissionResponse::from(request);
    if let Verdict::Rejected(rejection) = verdict {
        response.allowed = false;
        response.result =
            kube::core::Status::failure(&rejection.message, rejection.reason.as_str())
                .with_code(rejection.code);
    }
    response
}

/// Create the webhook router, routing reviews by the hook's declared resource
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    let (_, singular) = state.hook.validating_resource();
    Router::new()
        .route(&format!("/validate-{singular}"), post(validate_handler))
        .with_state(state)
}

/// Admission webhook handler: decode the review, delegate to the hook, and
/// serialize its verdict back into the review envelope.
async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            state.health.metrics.record_malformed();
            return (
                StatusCode::BAD_REQUEST,
                Json(
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                ),
            );
        }
    };

    let uid = request.uid.clone();
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    let verdict = state.hook.validate(&request).await;
    match &verdict {
        Verdict::Allowed => {
            info!(uid = %uid, "Admission request allowed");
            state.health.metrics.record_review("allowed");
        }
        Verdict::Rejected(rejection) => {
            warn!(
                uid = %uid,
                code = rejection.code,
                reason = rejection.reason.as_str(),
                message = %rejection.message,
                "Admission request rejected"
            );
            state.health.metrics.record_review(rejection.reason.as_str());
        }
    }

    (
        StatusCode::OK,
        Json(verdict_to_response(&request, &verdict).into_review()),
    )
}

/// Run the webhook server with TLS
///
/// Initializes the hook from the cluster client, marks the webhook ready,
/// then binds 0.0.0.0:9443 and serves the validation endpoint.
///
/// # Arguments
/// * `client` - Kubernetes client handed to the hook's `initialize`
/// * `hook` - The decision engine to host
/// * `health` - Shared health state (flipped to ready before serving)
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
pub async fn run_webhook_server(
    client: Client,
    hook: Arc<dyn AdmissionHook>,
    health: Arc<HealthState>,
    cert_path: &str,
    key_path: &str,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    hook.initialize(client).await;
    let (gvr, singular) = hook.validating_resource();
    info!(
        group = %gvr.group,
        version = %gvr.version,
        resource = %gvr.resource,
        singular = %singular,
        "Admission hook initialized"
    );
    health.set_ready(true).await;

    let state = Arc::new(WebhookState { hook, health });
    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], WEBHOOK_PORT));
    info!(port = WEBHOOK_PORT, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
