//! gateway-admission-webhook - A validating admission webhook for Gateway resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Creates the Kubernetes client
//! - Starts the health server and the TLS webhook server
//! - Handles graceful shutdown on SIGTERM/SIGINT

use std::path::Path;
use std::sync::Arc;

use kube::Client;
use tokio::signal;
use tracing::{error, info};

use gateway_admission_webhook::health::{HealthState, run_health_server};
use gateway_admission_webhook::{
    AdmissionHook, GatewayAdmission, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, run_webhook_server,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gateway_admission_webhook=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    info!("Starting gateway-admission-webhook");

    if !Path::new(WEBHOOK_CERT_PATH).exists() || !Path::new(WEBHOOK_KEY_PATH).exists() {
        return Err(format!(
            "TLS certificate or key not found at {WEBHOOK_CERT_PATH} / {WEBHOOK_KEY_PATH}"
        )
        .into());
    }

    // Create Kubernetes client (in-cluster config or local kubeconfig)
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (probes should work before readiness)
    let health_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Start the webhook server; it initializes the hook before serving.
    // Every replica serves: admission is stateless, so no leader election.
    let hook: Arc<dyn AdmissionHook> = Arc::new(GatewayAdmission::new());
    let webhook_handle = {
        let webhook_client = client.clone();
        let webhook_health = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_webhook_server(
                webhook_client,
                hook,
                webhook_health,
                WEBHOOK_CERT_PATH,
                WEBHOOK_KEY_PATH,
            )
            .await
            {
                error!("Webhook server error: {}", e);
            }
        })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the endpoint is drained before we exit
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
