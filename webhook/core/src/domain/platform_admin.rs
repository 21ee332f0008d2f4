// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PlatformAdmin and NodePool Resources
//!
//! Kubernetes-style API objects seen by the admission webhook.
//!
//! | Type | Group/Version | Scope | Role |
//! |------|---------------|-------|------|
//! | `PlatformAdmin` | `iot.openyurt.io/v1alpha1`, `v1alpha2` | Namespaced | Claims node pools via `spec.nodePools` |
//! | `NodePool` | `apps.openyurt.io/v1beta1` | Cluster | The contended resource |
//!
//! A `PlatformAdmin` claims a pool by listing its name; there is no separate
//! claim object. At any observed instant each pool should be claimed by at
//! most one `PlatformAdmin`.
//!
//! Only `metadata.name` and `spec.nodePools` take part in validation; every
//! other field is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const PLATFORM_ADMIN_GROUP: &str = "iot.openyurt.io";
pub const PLATFORM_ADMIN_KIND: &str = "PlatformAdmin";
pub const PLATFORM_ADMIN_VERSIONS: &[&str] = &["v1alpha1", "v1alpha2"];
/// Version used when listing PlatformAdmins from the API server.
pub const PLATFORM_ADMIN_STORAGE_VERSION: &str = "v1alpha2";

pub const NODE_POOL_GROUP: &str = "apps.openyurt.io";
pub const NODE_POOL_KIND: &str = "NodePool";
pub const NODE_POOL_VERSION: &str = "v1beta1";

/// `apiVersion` + `kind` header shared by every API object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            api_version: format!("{}/{}", group, version),
            kind: kind.to_string(),
        }
    }

    /// Group portion of `apiVersion` (empty for the core group)
    pub fn group(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    pub fn version(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((_, version)) => version,
            None => &self.api_version,
        }
    }
}

impl fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() && self.api_version.is_empty() {
            return write!(f, "<untyped object>");
        }
        write!(f, "{}, Kind={}", self.api_version, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAdminSpec {
    /// Names of the node pools this instance claims, in request order.
    /// Not deduplicated.
    #[serde(default)]
    pub node_pools: Vec<String>,

    /// Remaining spec fields (version, imageRegistry, platform, components, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformAdmin {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: PlatformAdminSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl PlatformAdmin {
    pub fn new(name: impl Into<String>, node_pools: Vec<String>) -> Self {
        Self {
            type_meta: TypeMeta::new(
                PLATFORM_ADMIN_GROUP,
                PLATFORM_ADMIN_STORAGE_VERSION,
                PLATFORM_ADMIN_KIND,
            ),
            metadata: ObjectMeta::named(name),
            spec: PlatformAdminSpec {
                node_pools,
                extra: Map::new(),
            },
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn node_pools(&self) -> &[String] {
        &self.spec.node_pools
    }

    pub fn claims(&self, pool: &str) -> bool {
        self.spec.node_pools.iter().any(|p| p == pool)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePool {
    #[serde(flatten)]
    pub type_meta: TypeMeta,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
}

impl NodePool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            type_meta: TypeMeta::new(NODE_POOL_GROUP, NODE_POOL_VERSION, NODE_POOL_KIND),
            metadata: ObjectMeta::named(name),
            spec: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// A decoded API object, dispatched on its `apiVersion`/`kind`.
///
/// Admission entry points match on this once and reject anything that is not
/// a `PlatformAdmin` as a malformed request.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeObject {
    PlatformAdmin(Box<PlatformAdmin>),
    NodePool(Box<NodePool>),
    Other(TypeMeta),
}

impl RuntimeObject {
    /// Decode a raw JSON object. Objects of a known kind must also decode
    /// into that kind's schema.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let type_meta: TypeMeta = serde_json::from_value(value.clone())?;

        if type_meta.kind == PLATFORM_ADMIN_KIND
            && type_meta.group() == PLATFORM_ADMIN_GROUP
            && PLATFORM_ADMIN_VERSIONS.contains(&type_meta.version())
        {
            return Ok(Self::PlatformAdmin(Box::new(serde_json::from_value(value)?)));
        }

        if type_meta.kind == NODE_POOL_KIND && type_meta.group() == NODE_POOL_GROUP {
            return Ok(Self::NodePool(Box::new(serde_json::from_value(value)?)));
        }

        Ok(Self::Other(type_meta))
    }

    pub fn type_meta(&self) -> &TypeMeta {
        match self {
            Self::PlatformAdmin(admin) => &admin.type_meta,
            Self::NodePool(pool) => &pool.type_meta,
            Self::Other(type_meta) => type_meta,
        }
    }
}

impl From<PlatformAdmin> for RuntimeObject {
    fn from(admin: PlatformAdmin) -> Self {
        Self::PlatformAdmin(Box::new(admin))
    }
}

impl From<NodePool> for RuntimeObject {
    fn from(pool: NodePool) -> Self {
        Self::NodePool(Box::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_platform_admin_keeps_unknown_spec_fields() {
        let value = json!({
            "apiVersion": "iot.openyurt.io/v1alpha2",
            "kind": "PlatformAdmin",
            "metadata": { "name": "edgex-hangzhou", "namespace": "default" },
            "spec": {
                "version": "minnesota",
                "nodePools": ["hangzhou", "hangzhou"],
                "platform": "edgex"
            }
        });

        let obj = RuntimeObject::from_value(value).unwrap();
        let admin = match obj {
            RuntimeObject::PlatformAdmin(admin) => admin,
            other => panic!("unexpected object: {:?}", other),
        };

        assert_eq!(admin.name(), "edgex-hangzhou");
        assert_eq!(admin.node_pools(), ["hangzhou", "hangzhou"]);
        assert_eq!(admin.spec.extra.get("platform"), Some(&json!("edgex")));
        assert_eq!(admin.metadata.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_decode_v1alpha1_platform_admin() {
        let value = json!({
            "apiVersion": "iot.openyurt.io/v1alpha1",
            "kind": "PlatformAdmin",
            "metadata": { "name": "legacy" },
            "spec": { "poolName": "beijing" }
        });

        match RuntimeObject::from_value(value).unwrap() {
            RuntimeObject::PlatformAdmin(admin) => assert!(admin.node_pools().is_empty()),
            other => panic!("unexpected object: {:?}", other),
        }
    }

    #[test]
    fn test_decode_other_kinds() {
        let pool = RuntimeObject::from_value(json!({
            "apiVersion": "apps.openyurt.io/v1beta1",
            "kind": "NodePool",
            "metadata": { "name": "hangzhou" }
        }))
        .unwrap();
        assert!(matches!(pool, RuntimeObject::NodePool(_)));

        let unknown_version = RuntimeObject::from_value(json!({
            "apiVersion": "iot.openyurt.io/v9",
            "kind": "PlatformAdmin"
        }))
        .unwrap();
        assert!(matches!(unknown_version, RuntimeObject::Other(_)));

        let configmap = RuntimeObject::from_value(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "cm" }
        }))
        .unwrap();
        assert_eq!(configmap.type_meta().to_string(), "v1, Kind=ConfigMap");
        assert_eq!(configmap.type_meta().group(), "");
    }

    #[test]
    fn test_decode_rejects_malformed_platform_admin() {
        let value = json!({
            "apiVersion": "iot.openyurt.io/v1alpha2",
            "kind": "PlatformAdmin",
            "metadata": { "name": "bad" },
            "spec": { "nodePools": "not-a-list" }
        });
        assert!(RuntimeObject::from_value(value).is_err());
    }

    #[test]
    fn test_claims() {
        let admin = PlatformAdmin::new("a", vec!["x".to_string(), "y".to_string()]);
        assert!(admin.claims("y"));
        assert!(!admin.claims("z"));
    }
}
