//! Object-level screening rules for gateway admission requests.
//!
//! Pure and stateless: the validator inspects the request and its payloads and
//! decides whether the request is exempt from class-binding checks, must be
//! rejected outright, or should proceed to GatewayClass authorization.
//!
//! The rules deliberately narrow the check to Create/Update of the top-level
//! gateway resource. Other verbs, sub-resource writes (status, finalizers),
//! and misrouted resource types pass through untouched.

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, Operation};

use crate::engine::verdict::{Reason, Rejection};
use crate::gateway::{GATEWAY_API_GROUP, GATEWAY_RESOURCE, Gateway};

/// Outcome of screening one admission request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectCheck {
    /// Out of scope for class-binding checks; allow without authorization.
    Exempt,
    /// Structurally valid; authorization for this class name is still needed.
    Authorize { gateway_class_name: String },
    /// Structurally invalid; reject without consulting authorization.
    Reject(Rejection),
}

/// Apply the screening rules in order; the first match wins.
pub fn screen(request: &AdmissionRequest<DynamicObject>) -> ObjectCheck {
    if !matches!(request.operation, Operation::Create | Operation::Update) {
        return ObjectCheck::Exempt;
    }
    if request
        .sub_resource
        .as_deref()
        .is_some_and(|sub| !sub.is_empty())
    {
        return ObjectCheck::Exempt;
    }
    if request.resource.group != GATEWAY_API_GROUP || request.resource.resource != GATEWAY_RESOURCE
    {
        return ObjectCheck::Exempt;
    }

    let gateway = match decode(request.object.as_ref()) {
        Ok(gateway) => gateway,
        Err(rejection) => return ObjectCheck::Reject(rejection),
    };
    if gateway.spec.gateway_class_name.is_empty() {
        return ObjectCheck::Reject(Rejection::new(
            Reason::Forbidden,
            "gatewayClassName is required",
        ));
    }

    if matches!(request.operation, Operation::Update) {
        let old_gateway = match decode(request.old_object.as_ref()) {
            Ok(old_gateway) => old_gateway,
            Err(rejection) => return ObjectCheck::Reject(rejection),
        };
        if old_gateway.spec.gateway_class_name != gateway.spec.gateway_class_name {
            return ObjectCheck::Reject(Rejection::new(
                Reason::Forbidden,
                "gatewayClassName is immutable",
            ));
        }
    }

    ObjectCheck::Authorize {
        gateway_class_name: gateway.spec.gateway_class_name,
    }
}

/// Decode the sparse Gateway projection from a dynamic payload.
///
/// A missing payload and a payload that fails to decode are both permanent
/// rejections of the request, surfaced as BadRequest with the decode error.
fn decode(object: Option<&DynamicObject>) -> Result<Gateway, Rejection> {
    let object = object.ok_or_else(|| {
        Rejection::new(Reason::BadRequest, "missing object payload in request")
    })?;
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|err| Rejection::new(Reason::BadRequest, err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use kube::core::{GroupVersionKind, GroupVersionResource, TypeMeta};
    use serde_json::json;

    /// Build a gateway admission request fixture targeting the gateway GVR.
    pub(crate) fn gateway_request(
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
            user_info: Default::default(),
            object: object.map(|value| serde_json::from_value(value).unwrap()),
            old_object: old_object.map(|value| serde_json::from_value(value).unwrap()),
            dry_run: false,
            options: None,
            types: TypeMeta::default(),
        }
    }

    pub(crate) fn gateway_payload(class_name: &str) -> serde_json::Value {
        json!({
            "apiVersion": "networking.x-k8s.io/v1alpha1",
            "kind": "Gateway",
            "metadata": {"name": "edge", "namespace": "default"},
            "spec": {"gatewayClassName": class_name}
        })
    }

    #[test]
    fn test_delete_is_exempt() {
        let request = gateway_request(Operation::Delete, None, None);
        assert_eq!(screen(&request), ObjectCheck::Exempt);
    }

    #[test]
    fn test_connect_is_exempt() {
        let request = gateway_request(Operation::Connect, None, None);
        assert_eq!(screen(&request), ObjectCheck::Exempt);
    }

    #[test]
    fn test_sub_resource_is_exempt() {
        let mut request =
            gateway_request(Operation::Update, Some(gateway_payload("prod")), None);
        request.sub_resource = Some("status".to_string());
        assert_eq!(screen(&request), ObjectCheck::Exempt);
    }

    #[test]
    fn test_other_resource_type_is_exempt() {
        let mut request = gateway_request(Operation::Create, Some(json!({"spec": 42})), None);
        request.resource =
            GroupVersionResource::gvr("networking.x-k8s.io", "v1alpha1", "gatewayclasses");
        assert_eq!(screen(&request), ObjectCheck::Exempt);
    }

    #[test]
    fn test_other_group_is_exempt() {
        let mut request = gateway_request(Operation::Create, Some(json!({"spec": 42})), None);
        request.resource = GroupVersionResource::gvr("example.com", "v1", "gateways");
        assert_eq!(screen(&request), ObjectCheck::Exempt);
    }

    #[test]
    fn test_missing_object_rejected_bad_request() {
        let request = gateway_request(Operation::Create, None, None);
        match screen(&request) {
            ObjectCheck::Reject(rejection) => {
                assert_eq!(rejection.code, 400);
                assert_eq!(rejection.reason, Reason::BadRequest);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_object_rejected_with_error_text() {
        let request = gateway_request(
            Operation::Create,
            Some(json!({"spec": {"gatewayClassName": {"nested": true}}})),
            None,
        );
        match screen(&request) {
            ObjectCheck::Reject(rejection) => {
                assert_eq!(rejection.code, 400);
                assert!(!rejection.message.is_empty());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_class_name_rejected_forbidden() {
        let request = gateway_request(Operation::Create, Some(gateway_payload("")), None);
        assert_eq!(
            screen(&request),
            ObjectCheck::Reject(Rejection::new(
                Reason::Forbidden,
                "gatewayClassName is required"
            ))
        );
    }

    #[test]
    fn test_create_with_class_name_needs_authorization() {
        let request = gateway_request(Operation::Create, Some(gateway_payload("prod")), None);
        assert_eq!(
            screen(&request),
            ObjectCheck::Authorize {
                gateway_class_name: "prod".to_string()
            }
        );
    }

    #[test]
    fn test_update_same_class_needs_authorization() {
        let request = gateway_request(
            Operation::Update,
            Some(gateway_payload("prod")),
            Some(gateway_payload("prod")),
        );
        assert_eq!(
            screen(&request),
            ObjectCheck::Authorize {
                gateway_class_name: "prod".to_string()
            }
        );
    }

    #[test]
    fn test_update_changed_class_rejected_immutable() {
        let request = gateway_request(
            Operation::Update,
            Some(gateway_payload("staging")),
            Some(gateway_payload("prod")),
        );
        assert_eq!(
            screen(&request),
            ObjectCheck::Reject(Rejection::new(
                Reason::Forbidden,
                "gatewayClassName is immutable"
            ))
        );
    }

    #[test]
    fn test_update_undecodable_old_object_rejected() {
        let request = gateway_request(
            Operation::Update,
            Some(gateway_payload("prod")),
            Some(json!({"spec": []})),
        );
        match screen(&request) {
            ObjectCheck::Reject(rejection) => assert_eq!(rejection.code, 400),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
