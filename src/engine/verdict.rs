//! Admission verdict types.
//!
//! A verdict is the only externally observable outcome of a review: either
//! allowed, or rejected with an HTTP status code, a machine reason, and a
//! human-readable message.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;

/// Machine-readable rejection category, mirroring the Kubernetes
/// `metav1.StatusReason` values this webhook can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Malformed object payload (HTTP 400).
    BadRequest,
    /// Policy violation or authorization denial (HTTP 403).
    Forbidden,
    /// Engine not ready or authorization backend failure (HTTP 500).
    InternalError,
}

impl Reason {
    /// The `metav1.Status` reason string for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::BadRequest => "BadRequest",
            Reason::Forbidden => "Forbidden",
            Reason::InternalError => "InternalError",
        }
    }

    /// The HTTP status code conventionally paired with this reason.
    pub fn code(&self) -> u16 {
        match self {
            Reason::BadRequest => 400,
            Reason::Forbidden => 403,
            Reason::InternalError => 500,
        }
    }
}

/// A rejection: status code, reason, and message surfaced to the requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub code: u16,
    pub reason: Reason,
    pub message: String,
}

impl Rejection {
    pub fn new(reason: Reason, message: impl Into<String>) -> Self {
        Self {
            code: reason.code(),
            reason,
            message: message.into(),
        }
    }

    /// Render as a Kubernetes failure `Status` for the admission response.
    pub fn to_status(&self) -> Status {
        Status {
            code: Some(i32::from(self.code)),
            message: Some(self.message.clone()),
            reason: Some(self.reason.as_str().to_string()),
            status: Some("Failure".to_string()),
            ..Default::default()
        }
    }
}

/// Final per-request outcome of the decision engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected(Rejection),
}

impl Verdict {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Verdict::Rejected(Rejection::new(Reason::BadRequest, message))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Verdict::Rejected(Rejection::new(Reason::Forbidden, message))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Verdict::Rejected(Rejection::new(Reason::InternalError, message))
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(Reason::BadRequest.code(), 400);
        assert_eq!(Reason::Forbidden.code(), 403);
        assert_eq!(Reason::InternalError.code(), 500);
    }

    #[test]
    fn test_rejection_to_status() {
        let status = Rejection::new(Reason::Forbidden, "gatewayClassName is required").to_status();
        assert_eq!(status.code, Some(403));
        assert_eq!(status.reason.as_deref(), Some("Forbidden"));
        assert_eq!(
            status.message.as_deref(),
            Some("gatewayClassName is required")
        );
        assert_eq!(status.status.as_deref(), Some("Failure"));
    }

    #[test]
    fn test_verdict_constructors() {
        assert!(Verdict::Allowed.is_allowed());
        let verdict = Verdict::internal_error("not initialized");
        match verdict {
            Verdict::Rejected(r) => {
                assert_eq!(r.code, 500);
                assert_eq!(r.message, "not initialized");
            }
            Verdict::Allowed => panic!("expected rejection"),
        }
    }
}
