// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Admission Decisions
//!
//! Outcome types for a single admission call and the per-request context
//! that bounds its catalog reads.
//!
//! | Error | Code | When |
//! |-------|------|------|
//! | `AdmissionError::BadRequest` | 400 | Inbound object is not a `PlatformAdmin` |
//! | `AdmissionError::Invalid` | 422 | Validation produced a non-empty `ErrorList` |

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::catalog::CatalogError;
use crate::domain::field::{aggregate_message, ErrorList, FieldError};
use crate::domain::platform_admin::{PLATFORM_ADMIN_GROUP, PLATFORM_ADMIN_KIND};

/// Non-fatal messages returned alongside an accepted request
pub type Warnings = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn platform_admin() -> Self {
        Self {
            group: PLATFORM_ADMIN_GROUP.to_string(),
            kind: PLATFORM_ADMIN_KIND.to_string(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{group_kind} \"{name}\" is invalid: {}", aggregate_message(.errors))]
    Invalid {
        group_kind: GroupKind,
        name: String,
        errors: ErrorList,
    },
}

impl AdmissionError {
    pub fn invalid_platform_admin(name: impl Into<String>, errors: ErrorList) -> Self {
        Self::Invalid {
            group_kind: GroupKind::platform_admin(),
            name: name.into(),
            errors,
        }
    }

    /// HTTP-style status code reported back to the API server
    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Invalid { .. } => 422,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BadRequest",
            Self::Invalid { .. } => "Invalid",
        }
    }

    pub fn causes(&self) -> &[FieldError] {
        match self {
            Self::BadRequest(_) => &[],
            Self::Invalid { errors, .. } => errors,
        }
    }
}

/// Cancellation and deadline for one admission call.
///
/// Catalog reads run through [`RequestContext::run`]; a read still in flight
/// when the token fires or the deadline passes fails, so the request is
/// rejected rather than admitted unchecked.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// No deadline, never cancelled unless [`cancel`](Self::cancel) is called
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Tie this context to an outer token, e.g. server shutdown
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.token = parent.child_token();
        self
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub async fn run<T, F>(&self, fut: F) -> Result<T, CatalogError>
    where
        F: Future<Output = Result<T, CatalogError>>,
    {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CatalogError::Cancelled),
            _ = deadline => Err(CatalogError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldPath;

    #[test]
    fn test_invalid_message() {
        let path = FieldPath::new("spec").child("nodePools");
        let err = AdmissionError::invalid_platform_admin(
            "edgex",
            vec![FieldError::invalid(&path, "A", "already used by other platformadmin instance")],
        );

        assert_eq!(
            err.to_string(),
            r#"PlatformAdmin.iot.openyurt.io "edgex" is invalid: spec.nodePools: Invalid value: "A": already used by other platformadmin instance"#
        );
        assert_eq!(err.code(), 422);
        assert_eq!(err.reason(), "Invalid");
        assert_eq!(err.causes().len(), 1);
    }

    #[test]
    fn test_bad_request() {
        let err = AdmissionError::BadRequest("expected a PlatformAdmin but got a v1, Kind=Pod".into());
        assert_eq!(err.code(), 400);
        assert!(err.causes().is_empty());
    }

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = RequestContext::background();
        let value = ctx.run(async { Ok::<_, CatalogError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_fails_when_cancelled() {
        let ctx = RequestContext::background();
        ctx.cancel();
        let result = ctx.run(async { Ok::<_, CatalogError>(7) }).await;
        assert!(matches!(result, Err(CatalogError::Cancelled)));
    }

    #[tokio::test]
    async fn test_child_context_follows_parent() {
        let parent = CancellationToken::new();
        let ctx = RequestContext::background().with_parent(&parent);
        parent.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_run_fails_on_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, CatalogError>(())
            })
            .await;
        assert!(matches!(result, Err(CatalogError::DeadlineExceeded)));
    }
}
