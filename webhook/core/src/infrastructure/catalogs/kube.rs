// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Kubernetes API server catalogs
//!
//! Lists NodePools (cluster scoped) and PlatformAdmins (all namespaces)
//! straight from the API server. Every call is a fresh paginated LIST; there
//! is no informer cache, so a decision always sees the server's current view.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::catalog::{CatalogError, NodePoolCatalog, PlatformAdminCatalog};
use crate::domain::platform_admin::{
    NodePool, PlatformAdmin, NODE_POOL_GROUP, NODE_POOL_VERSION, PLATFORM_ADMIN_GROUP,
    PLATFORM_ADMIN_STORAGE_VERSION,
};
use crate::domain::webhook_config::KubernetesCatalogConfig;

const PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    metadata: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    #[serde(rename = "continue", default)]
    continue_token: Option<String>,
}

/// Minimal authenticated LIST client for the Kubernetes API
#[derive(Debug, Clone)]
pub struct KubeClient {
    client: Client,
    api_server: String,
    token_path: Option<PathBuf>,
}

impl KubeClient {
    pub fn from_config(config: &KubernetesCatalogConfig) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(ca_path) = &config.ca_path {
            let pem = std::fs::read(ca_path)
                .with_context(|| format!("Failed to read CA bundle {}", ca_path))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("Failed to parse CA bundle {}", ca_path))?;
            builder = builder.add_root_certificate(cert);
        }

        if config.insecure_skip_tls_verify {
            tracing::warn!("TLS verification of the Kubernetes API server is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_server: config.api_server.trim_end_matches('/').to_string(),
            token_path: config.token_path.as_ref().map(PathBuf::from),
        })
    }

    async fn bearer_token(&self) -> Result<Option<String>, CatalogError> {
        let Some(path) = &self.token_path else {
            return Ok(None);
        };
        let token = tokio::fs::read_to_string(path).await.map_err(|e| {
            CatalogError::Unavailable(format!("failed to read token {}: {}", path.display(), e))
        })?;
        Ok(Some(token.trim().to_string()))
    }

    /// Follow `metadata.continue` until the collection is exhausted
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CatalogError> {
        let url = format!("{}{}", self.api_server, path);
        let token = self.bearer_token().await?;
        let limit = PAGE_SIZE.to_string();

        let mut items = Vec::new();
        let mut continue_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header(ACCEPT, "application/json")
                .query(&[("limit", limit.as_str())]);
            if let Some(cont) = &continue_token {
                request = request.query(&[("continue", cont.as_str())]);
            }
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let page: ObjectList<T> = response.json().await?;
            items.extend(page.items);

            match page.metadata.continue_token.filter(|c| !c.is_empty()) {
                Some(next) => continue_token = Some(next),
                None => break,
            }
        }

        debug!(path, count = items.len(), "Listed objects from API server");
        Ok(items)
    }
}

pub struct KubeNodePoolCatalog {
    client: KubeClient,
}

impl KubeNodePoolCatalog {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodePoolCatalog for KubeNodePoolCatalog {
    async fn list_node_pools(&self) -> Result<Vec<NodePool>, CatalogError> {
        let path = format!("/apis/{}/{}/nodepools", NODE_POOL_GROUP, NODE_POOL_VERSION);
        self.client.list(&path).await
    }
}

pub struct KubePlatformAdminCatalog {
    client: KubeClient,
}

impl KubePlatformAdminCatalog {
    pub fn new(client: KubeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformAdminCatalog for KubePlatformAdminCatalog {
    async fn list_platform_admins(&self) -> Result<Vec<PlatformAdmin>, CatalogError> {
        let path = format!(
            "/apis/{}/{}/platformadmins",
            PLATFORM_ADMIN_GROUP, PLATFORM_ADMIN_STORAGE_VERSION
        );
        self.client.list(&path).await
    }
}
