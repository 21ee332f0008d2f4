// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Catalog Factory - Application Layer
//!
//! Creates concrete catalog implementations from the configured backend,
//! keeping the domain layer free of infrastructure dependencies.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wire catalog adapters into the validator

use anyhow::Result;
use std::sync::Arc;

use crate::application::admission::StandardPlatformAdminAdmission;
use crate::application::validation_service::PlatformAdminValidator;
use crate::domain::catalog::{NodePoolCatalog, PlatformAdminCatalog};
use crate::domain::platform_admin::PlatformAdmin;
use crate::domain::webhook_config::CatalogBackend;
use crate::infrastructure::catalogs::{
    InMemoryNodePoolCatalog, InMemoryPlatformAdminCatalog, KubeClient, KubeNodePoolCatalog,
    KubePlatformAdminCatalog,
};

/// The pair of catalogs a validator reads from
#[derive(Clone)]
pub struct Catalogs {
    pub node_pools: Arc<dyn NodePoolCatalog>,
    pub platform_admins: Arc<dyn PlatformAdminCatalog>,
}

impl Catalogs {
    pub fn into_admission(self) -> StandardPlatformAdminAdmission {
        StandardPlatformAdminAdmission::new(PlatformAdminValidator::new(
            self.node_pools,
            self.platform_admins,
        ))
    }
}

/// Creates both catalogs for the configured backend
pub fn create_catalogs(backend: &CatalogBackend) -> Result<Catalogs> {
    match backend {
        CatalogBackend::InMemory { node_pools, platform_admins } => {
            tracing::info!(
                node_pools = node_pools.len(),
                platform_admins = platform_admins.len(),
                "Using in-memory catalogs"
            );
            Ok(Catalogs {
                node_pools: Arc::new(InMemoryNodePoolCatalog::from_names(node_pools.iter().cloned())),
                platform_admins: Arc::new(InMemoryPlatformAdminCatalog::from_admins(
                    platform_admins
                        .iter()
                        .map(|seed| PlatformAdmin::new(seed.name.clone(), seed.node_pools.clone())),
                )),
            })
        }
        CatalogBackend::Kubernetes(config) => {
            tracing::info!(api_server = %config.api_server, "Using Kubernetes API catalogs");
            let client = KubeClient::from_config(config)?;
            Ok(Catalogs {
                node_pools: Arc::new(KubeNodePoolCatalog::new(client.clone())),
                platform_admins: Arc::new(KubePlatformAdminCatalog::new(client)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook_config::{KubernetesCatalogConfig, PlatformAdminSeed};

    #[tokio::test]
    async fn test_in_memory_backend_is_seeded() {
        let backend = CatalogBackend::InMemory {
            node_pools: vec!["a".into(), "b".into()],
            platform_admins: vec![PlatformAdminSeed {
                name: "x".into(),
                node_pools: vec!["a".into()],
            }],
        };

        let catalogs = create_catalogs(&backend).unwrap();
        assert_eq!(catalogs.node_pools.list_node_pools().await.unwrap().len(), 2);

        let admins = catalogs.platform_admins.list_platform_admins().await.unwrap();
        assert_eq!(admins.len(), 1);
        assert!(admins[0].claims("a"));
    }

    #[test]
    fn test_kubernetes_backend_with_missing_ca_fails() {
        let backend = CatalogBackend::Kubernetes(KubernetesCatalogConfig {
            api_server: "https://127.0.0.1:6443".into(),
            token_path: None,
            ca_path: Some("/nonexistent/ca.crt".into()),
            insecure_skip_tls_verify: false,
        });
        assert!(create_catalogs(&backend).is_err());
    }

    #[test]
    fn test_kubernetes_backend_without_ca_builds() {
        let backend = CatalogBackend::Kubernetes(KubernetesCatalogConfig {
            api_server: "https://127.0.0.1:6443".into(),
            token_path: None,
            ca_path: None,
            insecure_skip_tls_verify: true,
        });
        assert!(create_catalogs(&backend).is_ok());
    }
}
