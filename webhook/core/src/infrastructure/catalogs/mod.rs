// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Implementations
//!
//! Infrastructure implementations of the catalog interfaces defined in
//! `crate::domain::catalog`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** List node pools and platform admins for admission checks
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## Kubernetes API
//!
//! - **KubeNodePoolCatalog** - `GET /apis/apps.openyurt.io/v1beta1/nodepools`
//! - **KubePlatformAdminCatalog** - `GET /apis/iot.openyurt.io/v1alpha2/platformadmins`
//!
//! ## In-Memory
//!
//! Insertion-ordered snapshots for tests, local runs and `poolguard check`:
//! - **InMemoryNodePoolCatalog**
//! - **InMemoryPlatformAdminCatalog**

pub mod kube;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::catalog::{CatalogError, NodePoolCatalog, PlatformAdminCatalog};
use crate::domain::platform_admin::{NodePool, PlatformAdmin};

pub use kube::{KubeClient, KubeNodePoolCatalog, KubePlatformAdminCatalog};

#[derive(Clone, Default)]
pub struct InMemoryNodePoolCatalog {
    pools: Arc<RwLock<Vec<NodePool>>>,
}

impl InMemoryNodePoolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let catalog = Self::new();
        for name in names {
            catalog.upsert(NodePool::new(name));
        }
        catalog
    }

    /// Insert or replace by name, keeping the original position on replace
    pub fn upsert(&self, pool: NodePool) {
        let mut pools = self.pools.write();
        match pools.iter_mut().find(|p| p.name() == pool.name()) {
            Some(existing) => *existing = pool,
            None => pools.push(pool),
        }
    }

    pub fn remove(&self, name: &str) -> Option<NodePool> {
        let mut pools = self.pools.write();
        let idx = pools.iter().position(|p| p.name() == name)?;
        Some(pools.remove(idx))
    }
}

#[async_trait]
impl NodePoolCatalog for InMemoryNodePoolCatalog {
    async fn list_node_pools(&self) -> Result<Vec<NodePool>, CatalogError> {
        let pools = self.pools.read().clone();
        Ok(pools)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPlatformAdminCatalog {
    admins: Arc<RwLock<Vec<PlatformAdmin>>>,
}

impl InMemoryPlatformAdminCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_admins(admins: impl IntoIterator<Item = PlatformAdmin>) -> Self {
        let catalog = Self::new();
        for admin in admins {
            catalog.upsert(admin);
        }
        catalog
    }

    /// Insert or replace by name, keeping the original position on replace
    pub fn upsert(&self, admin: PlatformAdmin) {
        let mut admins = self.admins.write();
        match admins.iter_mut().find(|a| a.name() == admin.name()) {
            Some(existing) => *existing = admin,
            None => admins.push(admin),
        }
    }

    pub fn remove(&self, name: &str) -> Option<PlatformAdmin> {
        let mut admins = self.admins.write();
        let idx = admins.iter().position(|a| a.name() == name)?;
        Some(admins.remove(idx))
    }
}

#[async_trait]
impl PlatformAdminCatalog for InMemoryPlatformAdminCatalog {
    async fn list_platform_admins(&self) -> Result<Vec<PlatformAdmin>, CatalogError> {
        let admins = self.admins.read().clone();
        Ok(admins)
    }
}
