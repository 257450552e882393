//! Sparse projection of the Gateway resource.
//!
//! The webhook only decides class-binding questions, so only
//! `spec.gatewayClassName` is modeled. Everything else in the payload is
//! intentionally ignored so that new Gateway fields never break admission.

use serde::{Deserialize, Serialize};

/// API group of the Gateway and GatewayClass resources.
pub const GATEWAY_API_GROUP: &str = "networking.x-k8s.io";
/// Plural resource name of the Gateway resource.
pub const GATEWAY_RESOURCE: &str = "gateways";
/// Plural resource name of the GatewayClass resource.
pub const GATEWAY_CLASS_RESOURCE: &str = "gatewayclasses";
/// API version used for GatewayClass authorization queries.
pub const GATEWAY_CLASS_VERSION: &str = "v1alpha1";
/// Verb an identity must hold on a GatewayClass to bind gateways to it.
pub const GATEWAY_CLASS_USE_VERB: &str = "use";

/// API group this webhook registers under for admission reviews.
pub const ADMISSION_GROUP: &str = "admission.networking.x-k8s.io";
/// API version this webhook registers under.
pub const ADMISSION_VERSION: &str = "v1alpha2";
/// Singular name of the validated resource.
pub const GATEWAY_SINGULAR: &str = "gateway";

/// Minimal Gateway decoding target.
///
/// Missing fields decode to their defaults (an absent spec yields an empty
/// class name, which is a policy rejection rather than a decode error).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Gateway {
    #[serde(default)]
    pub spec: GatewaySpec,
}

/// The one Gateway spec field admission cares about.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default)]
    pub gateway_class_name: String,
}
