// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Catalog Interfaces
//!
//! Read-only views of cluster state consulted during admission, defined in the
//! domain layer and implemented in `crate::infrastructure::catalogs`.
//!
//! | Trait | Lists | Implementations |
//! |-------|-------|----------------|
//! | `NodePoolCatalog` | `NodePool` | `InMemoryNodePoolCatalog`, `KubeNodePoolCatalog` |
//! | `PlatformAdminCatalog` | `PlatformAdmin` | `InMemoryPlatformAdminCatalog`, `KubePlatformAdminCatalog` |
//!
//! Each call is a point-in-time snapshot. Nothing is cached between calls and
//! nothing is written back.

use async_trait::async_trait;
use thiserror::Error;
use crate::domain::platform_admin::{NodePool, PlatformAdmin};

#[async_trait]
pub trait NodePoolCatalog: Send + Sync {
    /// List every node pool in the cluster
    async fn list_node_pools(&self) -> Result<Vec<NodePool>, CatalogError>;
}

#[async_trait]
pub trait PlatformAdminCatalog: Send + Sync {
    /// List every PlatformAdmin across all namespaces
    async fn list_platform_admins(&self) -> Result<Vec<PlatformAdmin>, CatalogError>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Unavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode list response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Unavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}
