//! gateway-admission-webhook library crate
//!
//! A validating admission webhook for Gateway resources. Create/Update
//! requests are screened structurally (class name present, class binding
//! immutable) and then authorized against the cluster's authorization layer:
//! the requesting identity must be allowed to `use` the named GatewayClass.

pub mod authz;
pub mod engine;
pub mod gateway;
pub mod health;
pub mod webhooks;

pub use engine::{GatewayAdmission, Verdict};
pub use health::HealthState;
pub use webhooks::{
    AdmissionHook, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError,
    run_webhook_server,
};
