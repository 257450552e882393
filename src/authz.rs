//! Delegated GatewayClass authorization.
//!
//! Asks the cluster's authorization layer whether the requesting identity may
//! `use` the named GatewayClass, via a SubjectAccessReview. One authoritative
//! query per admission request: no retries and no caching, so every decision
//! reflects current policy.

use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::UserInfo;
use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SubjectAccessReview, SubjectAccessReviewSpec,
};
use kube::api::PostParams;
use kube::{Api, Client};

use crate::gateway::{
    GATEWAY_API_GROUP, GATEWAY_CLASS_RESOURCE, GATEWAY_CLASS_USE_VERB, GATEWAY_CLASS_VERSION,
};

/// Tri-state answer from the authorization backend.
///
/// `Indeterminate` covers both transport failures and abstentions; neither is
/// ever treated as an allow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthzDecision {
    Allowed,
    Denied(String),
    Indeterminate(String),
}

/// Capability to answer "may this identity use this GatewayClass".
///
/// The decision engine depends on this seam rather than on a concrete client,
/// so transports and tests can supply their own implementations.
#[async_trait]
pub trait ClassAuthorizer: Send + Sync {
    async fn authorize_use(&self, user: &UserInfo, class_name: &str) -> AuthzDecision;
}

/// Production authorizer backed by the Kubernetes SubjectAccessReview API.
pub struct SubjectAccessReviewAuthorizer {
    api: Api<SubjectAccessReview>,
}

impl SubjectAccessReviewAuthorizer {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait]
impl ClassAuthorizer for SubjectAccessReviewAuthorizer {
    async fn authorize_use(&self, user: &UserInfo, class_name: &str) -> AuthzDecision {
        let review = build_review(user, class_name);
        match self.api.create(&PostParams::default(), &review).await {
            Ok(created) => decision_from_status(created.status),
            Err(err) => AuthzDecision::Indeterminate(err.to_string()),
        }
    }
}

/// Compose the SubjectAccessReview for one admission request.
///
/// The identity is forwarded verbatim. An absent `extra` map stays absent
/// rather than becoming an empty map, so the backend sees the same payload
/// the API server sent us.
fn build_review(user: &UserInfo, class_name: &str) -> SubjectAccessReview {
    SubjectAccessReview {
        spec: SubjectAccessReviewSpec {
            user: user.username.clone(),
            uid: user.uid.clone(),
            groups: user.groups.clone(),
            extra: user.extra.clone(),
            resource_attributes: Some(ResourceAttributes {
                group: Some(GATEWAY_API_GROUP.to_string()),
                version: Some(GATEWAY_CLASS_VERSION.to_string()),
                resource: Some(GATEWAY_CLASS_RESOURCE.to_string()),
                verb: Some(GATEWAY_CLASS_USE_VERB.to_string()),
                name: Some(class_name.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn decision_from_status(
    status: Option<k8s_openapi::api::authorization::v1::SubjectAccessReviewStatus>,
) -> AuthzDecision {
    match status {
        Some(status) if status.allowed => AuthzDecision::Allowed,
        Some(status) if status.denied == Some(true) => {
            AuthzDecision::Denied(status.reason.unwrap_or_default())
        }
        Some(status) => AuthzDecision::Indeterminate(status.reason.unwrap_or_default()),
        None => AuthzDecision::Indeterminate("authorization backend returned no status".to_string()),
    }
}
