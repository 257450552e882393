//! Gateway admission decision engine.
//!
//! Orchestrates one review: screen the request with the object validator,
//! then, for requests that bind a GatewayClass, ask the authorization backend
//! whether the requesting identity may `use` that class. Every outcome —
//! including "engine not initialized" and ambiguous authorization answers —
//! resolves to a verdict; ambiguity always fails closed.

pub mod validator;
pub mod verdict;

use std::sync::Arc;

use async_trait::async_trait;
use kube::Client;
use kube::core::admission::AdmissionRequest;
use kube::core::{DynamicObject, GroupVersionResource};
use tokio::sync::RwLock;
use tracing::debug;

use crate::authz::{AuthzDecision, ClassAuthorizer, SubjectAccessReviewAuthorizer};
use crate::gateway::{ADMISSION_GROUP, ADMISSION_VERSION, GATEWAY_RESOURCE, GATEWAY_SINGULAR};
use crate::webhooks::AdmissionHook;

pub use validator::{ObjectCheck, screen};
pub use verdict::{Reason, Rejection, Verdict};

/// The validating admission hook for Gateway resources.
///
/// The authorizer slot is written exactly once, by `initialize`; `validate`
/// only ever takes read-side snapshots. While the slot is empty the engine
/// rejects with 500 rather than guessing.
pub struct GatewayAdmission {
    authorizer: RwLock<Option<Arc<dyn ClassAuthorizer>>>,
}

impl GatewayAdmission {
    pub fn new() -> Self {
        Self {
            authorizer: RwLock::new(None),
        }
    }

    /// Install the authorizer and mark the engine ready.
    ///
    /// `initialize` uses this with the SubjectAccessReview-backed authorizer;
    /// tests inject stubs through the same path.
    pub async fn install_authorizer(&self, authorizer: Arc<dyn ClassAuthorizer>) {
        *self.authorizer.write().await = Some(authorizer);
    }

    async fn decide(&self, request: &AdmissionRequest<DynamicObject>) -> Verdict {
        let class_name = match screen(request) {
            ObjectCheck::Exempt => return Verdict::Allowed,
            ObjectCheck::Reject(rejection) => return Verdict::Rejected(rejection),
            ObjectCheck::Authorize { gateway_class_name } => gateway_class_name,
        };

        // Snapshot outside the await so readers never hold the lock across
        // the authorization call.
        let authorizer = self.authorizer.read().await.clone();
        let Some(authorizer) = authorizer else {
            return Verdict::internal_error("not initialized");
        };

        debug!(
            name = %request.name,
            class = %class_name,
            user = ?request.user_info.username,
            "Querying GatewayClass authorization"
        );
        match authorizer
            .authorize_use(&request.user_info, &class_name)
            .await
        {
            AuthzDecision::Allowed => Verdict::Allowed,
            AuthzDecision::Denied(reason) => Verdict::forbidden(reason),
            AuthzDecision::Indeterminate(reason) => Verdict::internal_error(reason),
        }
    }
}

impl Default for GatewayAdmission {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdmissionHook for GatewayAdmission {
    fn validating_resource(&self) -> (GroupVersionResource, &'static str) {
        (
            GroupVersionResource::gvr(ADMISSION_GROUP, ADMISSION_VERSION, GATEWAY_RESOURCE),
            GATEWAY_SINGULAR,
        )
    }

    async fn initialize(&self, client: Client) {
        self.install_authorizer(Arc::new(SubjectAccessReviewAuthorizer::new(client)))
            .await;
    }

    async fn validate(&self, request: &AdmissionRequest<DynamicObject>) -> Verdict {
        self.decide(request).await
    }
}
