// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PlatformAdmin Validation Service
//!
//! Checks that a `PlatformAdmin` only claims node pools that exist and that no
//! other `PlatformAdmin` already claims.
//!
//! ## Flow
//!
//! ```text
//! CheckExistence ──errors──→ Done
//!       │
//!       └── clean ──→ CheckClaims ──→ Done
//! ```
//!
//! Existence errors are reported on their own so a caller is never told about
//! a claim conflict on a pool that does not exist.
//!
//! ## Consistency
//!
//! Both checks read a point-in-time snapshot with no lock or transaction
//! around the decision. Two requests for different PlatformAdmins claiming the
//! same pool can both pass if they are admitted concurrently. Closing that
//! window needs a serialized claim ledger outside this service.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::admission::RequestContext;
use crate::domain::catalog::{NodePoolCatalog, PlatformAdminCatalog};
use crate::domain::field::{ErrorList, FieldError, FieldPath};
use crate::domain::platform_admin::PlatformAdmin;

pub const DETAIL_UNKNOWN_NODE_POOLS: &str = "can not find the nodepools";
pub const DETAIL_ALREADY_CLAIMED: &str = "already used by other platformadmin instance";

/// `spec.nodePools`, the field every error in this module points at
pub fn node_pools_path() -> FieldPath {
    FieldPath::new("spec").child("nodePools")
}

/// A pool requested by the candidate that another instance already holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConflict {
    pub pool: String,
    pub claimed_by: String,
}

pub struct PlatformAdminValidator {
    node_pools: Arc<dyn NodePoolCatalog>,
    platform_admins: Arc<dyn PlatformAdminCatalog>,
}

impl PlatformAdminValidator {
    pub fn new(
        node_pools: Arc<dyn NodePoolCatalog>,
        platform_admins: Arc<dyn PlatformAdminCatalog>,
    ) -> Self {
        Self { node_pools, platform_admins }
    }

    /// Run both checks in order. Empty result means valid.
    pub async fn validate(&self, ctx: &RequestContext, admin: &PlatformAdmin) -> ErrorList {
        let errs = self.validate_node_pools_exist(ctx, admin).await;
        if !errs.is_empty() {
            return errs;
        }
        self.validate_exclusive_claims(ctx, admin).await
    }

    /// Every requested pool must be in the node pool catalog
    pub async fn validate_node_pools_exist(
        &self,
        ctx: &RequestContext,
        admin: &PlatformAdmin,
    ) -> ErrorList {
        let path = node_pools_path();

        let pools = match ctx.run(self.node_pools.list_node_pools()).await {
            Ok(pools) => pools,
            Err(err) => {
                warn!(platform_admin = admin.name(), error = %err, "Failed to list node pools");
                metrics::counter!("poolguard_catalog_errors_total", "catalog" => "nodepools")
                    .increment(1);
                return vec![FieldError::invalid(
                    &path,
                    admin.node_pools().to_vec(),
                    format!("can not list nodepools, cause {}", err),
                )];
            }
        };

        let known: HashSet<&str> = pools.iter().map(|p| p.name()).collect();
        let unknown = unknown_pools(admin.node_pools(), &known);
        if unknown.is_empty() {
            return vec![];
        }

        debug!(platform_admin = admin.name(), unknown = ?unknown, "Unknown node pools requested");
        vec![FieldError::invalid(&path, unknown, DETAIL_UNKNOWN_NODE_POOLS)]
    }

    /// No other PlatformAdmin may already claim a requested pool
    pub async fn validate_exclusive_claims(
        &self,
        ctx: &RequestContext,
        admin: &PlatformAdmin,
    ) -> ErrorList {
        let path = node_pools_path();

        let others = match ctx.run(self.platform_admins.list_platform_admins()).await {
            Ok(others) => others,
            Err(err) => {
                warn!(platform_admin = admin.name(), error = %err, "Failed to list platform admins");
                metrics::counter!("poolguard_catalog_errors_total", "catalog" => "platformadmins")
                    .increment(1);
                return vec![FieldError::invalid(
                    &path,
                    admin.node_pools().to_vec(),
                    format!("can not list platformadmins, cause {}", err),
                )];
            }
        };

        match first_conflict(admin, &others) {
            Some(conflict) => {
                debug!(
                    platform_admin = admin.name(),
                    pool = %conflict.pool,
                    claimed_by = %conflict.claimed_by,
                    "Node pool already claimed"
                );
                vec![FieldError::invalid(&path, conflict.pool, DETAIL_ALREADY_CLAIMED)]
            }
            None => vec![],
        }
    }
}

/// Requested names missing from `known`, in request order. Duplicates are kept.
pub fn unknown_pools(requested: &[String], known: &HashSet<&str>) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect()
}

/// First pool of `candidate` claimed by a differently named instance.
///
/// Scans `others` in order and, within each, the candidate's pools in order.
/// Stops at the first hit.
pub fn first_conflict(candidate: &PlatformAdmin, others: &[PlatformAdmin]) -> Option<ClaimConflict> {
    others
        .iter()
        .filter(|other| other.name() != candidate.name())
        .find_map(|other| {
            candidate
                .node_pools()
                .iter()
                .find(|pool| other.claims(pool))
                .map(|pool| ClaimConflict {
                    pool: pool.clone(),
                    claimed_by: other.name().to_string(),
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CatalogError;
    use crate::domain::platform_admin::NodePool;
    use crate::infrastructure::catalogs::{InMemoryNodePoolCatalog, InMemoryPlatformAdminCatalog};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pools(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn validator(node_pools: &[&str], admins: Vec<PlatformAdmin>) -> PlatformAdminValidator {
        PlatformAdminValidator::new(
            Arc::new(InMemoryNodePoolCatalog::from_names(node_pools.iter().copied())),
            Arc::new(InMemoryPlatformAdminCatalog::from_admins(admins)),
        )
    }

    struct DownCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NodePoolCatalog for DownCatalog {
        async fn list_node_pools(&self) -> Result<Vec<NodePool>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::Unavailable("timeout".into()))
        }
    }

    #[async_trait]
    impl PlatformAdminCatalog for DownCatalog {
        async fn list_platform_admins(&self) -> Result<Vec<PlatformAdmin>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::Unavailable("connection refused".into()))
        }
    }

    // ── pure helpers ─────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_pools_keeps_order_and_duplicates() {
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();
        let requested = pools(&["d", "a", "d", "e"]);
        assert_eq!(unknown_pools(&requested, &known), pools(&["d", "d", "e"]));
    }

    #[test]
    fn test_first_conflict_skips_same_name() {
        let candidate = PlatformAdmin::new("x", pools(&["a"]));
        let stored_self = PlatformAdmin::new("x", pools(&["a"]));
        assert_eq!(first_conflict(&candidate, &[stored_self]), None);
    }

    #[test]
    fn test_first_conflict_follows_catalog_then_request_order() {
        let candidate = PlatformAdmin::new("y", pools(&["c", "b", "a"]));
        let others = vec![
            PlatformAdmin::new("first", pools(&["a", "b"])),
            PlatformAdmin::new("second", pools(&["c"])),
        ];

        let conflict = first_conflict(&candidate, &others).unwrap();
        assert_eq!(conflict.pool, "b");
        assert_eq!(conflict.claimed_by, "first");
    }

    // ── orchestrated validation ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_empty_pool_list_is_valid() {
        let v = validator(&[], vec![PlatformAdmin::new("other", pools(&["a"]))]);
        let admin = PlatformAdmin::new("x", vec![]);
        assert!(v.validate(&RequestContext::background(), &admin).await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_unclaimed_pools_are_valid() {
        let v = validator(&["a", "b", "c"], vec![PlatformAdmin::new("other", pools(&["c"]))]);
        let admin = PlatformAdmin::new("x", pools(&["a", "b"]));
        assert!(v.validate(&RequestContext::background(), &admin).await.is_empty());
    }

    #[tokio::test]
    async fn test_claimed_pool_is_rejected() {
        let v = validator(&["A", "B", "C"], vec![PlatformAdmin::new("X", pools(&["A"]))]);
        let admin = PlatformAdmin::new("Y", pools(&["A"]));

        let errs = v.validate(&RequestContext::background(), &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "spec.nodePools");
        assert_eq!(errs[0].bad_value, json!("A"));
        assert_eq!(errs[0].detail, DETAIL_ALREADY_CLAIMED);
    }

    #[tokio::test]
    async fn test_unknown_pool_is_rejected_in_batch() {
        let v = validator(&["A", "B"], vec![]);
        let admin = PlatformAdmin::new("Z", pools(&["A", "D"]));

        let errs = v.validate(&RequestContext::background(), &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].bad_value, json!(["D"]));
        assert_eq!(errs[0].detail, DETAIL_UNKNOWN_NODE_POOLS);
    }

    #[tokio::test]
    async fn test_existence_errors_hide_conflicts() {
        let v = validator(&["A"], vec![PlatformAdmin::new("X", pools(&["A"]))]);
        let admin = PlatformAdmin::new("Y", pools(&["A", "missing"]));

        let errs = v.validate(&RequestContext::background(), &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].bad_value, json!(["missing"]));
    }

    #[tokio::test]
    async fn test_self_duplicate_pool_is_not_an_error() {
        let v = validator(&["A"], vec![PlatformAdmin::new("X", pools(&["A", "A"]))]);
        let admin = PlatformAdmin::new("X", pools(&["A", "A"]));
        assert!(v.validate(&RequestContext::background(), &admin).await.is_empty());
    }

    #[tokio::test]
    async fn test_node_pool_listing_failure_rejects_and_skips_claims() {
        let down = Arc::new(DownCatalog { calls: AtomicUsize::new(0) });
        let v = PlatformAdminValidator::new(down.clone(), down.clone());
        let admin = PlatformAdmin::new("x", pools(&["a", "b"]));

        let errs = v.validate(&RequestContext::background(), &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].bad_value, json!(["a", "b"]));
        assert!(errs[0].detail.contains("can not list nodepools, cause timeout"));
        assert_eq!(down.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_platform_admin_listing_failure_rejects() {
        let down = Arc::new(DownCatalog { calls: AtomicUsize::new(0) });
        let v = PlatformAdminValidator::new(
            Arc::new(InMemoryNodePoolCatalog::from_names(["a"])),
            down,
        );
        let admin = PlatformAdmin::new("x", pools(&["a"]));

        let errs = v.validate(&RequestContext::background(), &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].detail, "can not list platformadmins, cause connection refused");
    }

    #[tokio::test]
    async fn test_cancelled_context_fails_closed() {
        let v = validator(&["a"], vec![]);
        let admin = PlatformAdmin::new("x", pools(&["a"]));
        let ctx = RequestContext::background();
        ctx.cancel();

        let errs = v.validate(&ctx, &admin).await;
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].detail, "can not list nodepools, cause request cancelled");
    }
}
