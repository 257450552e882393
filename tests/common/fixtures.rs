//! Admission request fixtures and stub authorizers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::UserInfo;
use kube::core::admission::{AdmissionRequest, Operation};
use kube::core::{DynamicObject, GroupVersionKind, GroupVersionResource, TypeMeta};
use serde_json::json;

use gateway_admission_webhook::GatewayAdmission;
use gateway_admission_webhook::authz::{AuthzDecision, ClassAuthorizer};

/// Build an admission request targeting the gateway resource.
pub fn gateway_request(
    operation: Operation,
    object: Option<serde_json::Value>,
    old_object: Option<serde_json::Value>,
) -> AdmissionRequest<DynamicObject> {
    AdmissionRequest {
        uid: "test-uid".to_string(),
        kind: GroupVersionKind::gvk("networking.x-k8s.io", "v1alpha1", "Gateway"),
        resource: GroupVersionResource::gvr("networking.x-k8s.io", "v1alpha1", "gateways"),
        sub_resource: None,
        request_kind: None,
        request_resource: None,
        request_sub_resource: None,
        name: "edge".to_string(),
        namespace: Some("default".to_string()),
        operation,
        user_info: UserInfo {
            username: Some("jane".to_string()),
            uid: Some("uid-1".to_string()),
            groups: Some(vec!["system:authenticated".to_string()]),
            extra: None,
        },
        object: object.map(must_dynamic),
        old_object: old_object.map(must_dynamic),
        dry_run: false,
        options: None,
        types: TypeMeta::default(),
    }
}

/// A gateway payload bound to the given class.
pub fn gateway_payload(class_name: &str) -> serde_json::Value {
    json!({
        "apiVersion": "networking.x-k8s.io/v1alpha1",
        "kind": "Gateway",
        "metadata": {"name": "edge", "namespace": "default"},
        "spec": {"gatewayClassName": class_name}
    })
}

#[allow(clippy::unwrap_used)]
fn must_dynamic(value: serde_json::Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

/// Stub authorizer returning a fixed decision and recording whether it ran.
pub struct FixedAuthorizer {
    decision: AuthzDecision,
    called: AtomicBool,
}

impl FixedAuthorizer {
    pub fn new(decision: AuthzDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            called: AtomicBool::new(false),
        })
    }

    pub fn was_called(&self) -> bool {
        self.called.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassAuthorizer for FixedAuthorizer {
    async fn authorize_use(&self, _user: &UserInfo, _class_name: &str) -> AuthzDecision {
        self.called.store(true, Ordering::SeqCst);
        self.decision.clone()
    }
}

/// An engine with the given stub decision already installed.
pub async fn ready_engine(decision: AuthzDecision) -> (GatewayAdmission, Arc<FixedAuthorizer>) {
    let engine = GatewayAdmission::new();
    let authorizer = FixedAuthorizer::new(decision);
    engine.install_authorizer(authorizer.clone()).await;
    (engine, authorizer)
}
