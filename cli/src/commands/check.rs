// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Offline admission check
//!
//! Runs a PlatformAdmin manifest through the same admission use case the
//! webhook serves, against the catalogs named in the configuration.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

use poolguard_core::application::{create_catalogs, PlatformAdminAdmission};
use poolguard_core::domain::admission::{AdmissionError, RequestContext, Warnings};
use poolguard_core::domain::platform_admin::RuntimeObject;
use poolguard_core::domain::webhook_config::WebhookConfigManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckOperation {
    Create,
    Update,
    Delete,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// PlatformAdmin manifest to admit (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub object: PathBuf,

    /// Previous version of the object, required for update
    #[arg(long, value_name = "FILE")]
    pub old: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CheckOperation::Create)]
    pub operation: CheckOperation,
}

/// Returns whether the object was admitted
pub async fn execute(args: CheckArgs, config_path: Option<PathBuf>) -> Result<bool> {
    let config = WebhookConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let admission = create_catalogs(&config.spec.catalog)
        .context("Failed to initialize catalogs")?
        .into_admission();
    let ctx = RequestContext::with_timeout(config.spec.server.request_timeout());

    let result = evaluate(&admission, &ctx, &args).await?;
    print_result(&result);
    Ok(result.is_ok())
}

pub async fn evaluate(
    admission: &dyn PlatformAdminAdmission,
    ctx: &RequestContext,
    args: &CheckArgs,
) -> Result<Result<Warnings, AdmissionError>> {
    let obj = read_object(&args.object)?;

    Ok(match args.operation {
        CheckOperation::Create => admission.validate_create(ctx, &obj).await,
        CheckOperation::Update => {
            let Some(old) = &args.old else {
                bail!("--old is required when --operation is update");
            };
            let old_obj = read_object(old)?;
            admission.validate_update(ctx, &old_obj, &obj).await
        }
        CheckOperation::Delete => admission.validate_delete(ctx, &obj).await,
    })
}

/// Read a manifest file; JSON parses as YAML too
pub fn read_object(path: &Path) -> Result<RuntimeObject> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    RuntimeObject::from_value(value)
        .with_context(|| format!("Failed to decode object in {}", path.display()))
}

fn print_result(result: &Result<Warnings, AdmissionError>) {
    match result {
        Ok(warnings) => {
            println!("{}", "✓ Admitted".green());
            for warning in warnings {
                println!("  {} {}", "warning:".yellow(), warning);
            }
        }
        Err(err) => {
            println!(
                "{}",
                format!("✗ Denied ({}, {})", err.reason(), err.code()).red()
            );
            println!("  {}", err);
            for cause in err.causes() {
                println!("    - {}: {}", cause.field.bold(), cause.error_body());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolguard_core::application::Catalogs;
    use poolguard_core::domain::platform_admin::PlatformAdmin;
    use poolguard_core::infrastructure::catalogs::{
        InMemoryNodePoolCatalog, InMemoryPlatformAdminCatalog,
    };
    use std::sync::Arc;

    const CANDIDATE: &str = r#"
apiVersion: iot.openyurt.io/v1alpha2
kind: PlatformAdmin
metadata:
  name: edgex-hangzhou
  namespace: default
spec:
  version: minnesota
  nodePools:
    - hangzhou
"#;

    fn admission(admins: Vec<PlatformAdmin>) -> impl PlatformAdminAdmission {
        Catalogs {
            node_pools: Arc::new(InMemoryNodePoolCatalog::from_names(["hangzhou", "beijing"])),
            platform_admins: Arc::new(InMemoryPlatformAdminCatalog::from_admins(admins)),
        }
        .into_admission()
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_check_admits_free_pool() {
        let dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            object: write(&dir, "admin.yaml", CANDIDATE),
            old: None,
            operation: CheckOperation::Create,
        };

        let result = evaluate(&admission(vec![]), &RequestContext::background(), &args)
            .await
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_check_denies_claimed_pool() {
        let dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            object: write(&dir, "admin.yaml", CANDIDATE),
            old: None,
            operation: CheckOperation::Create,
        };
        let owner = PlatformAdmin::new("edgex-other", vec!["hangzhou".into()]);

        let err = evaluate(&admission(vec![owner]), &RequestContext::background(), &args)
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.code(), 422);
        assert_eq!(err.causes()[0].field, "spec.nodePools");
    }

    #[tokio::test]
    async fn test_check_reads_json_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{"apiVersion":"iot.openyurt.io/v1alpha2","kind":"PlatformAdmin","metadata":{"name":"j"},"spec":{"nodePools":["shanghai"]}}"#;
        let args = CheckArgs {
            object: write(&dir, "admin.json", json),
            old: None,
            operation: CheckOperation::Create,
        };

        let err = evaluate(&admission(vec![]), &RequestContext::background(), &args)
            .await
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("can not find the nodepools"));
    }

    #[tokio::test]
    async fn test_update_requires_old_object() {
        let dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            object: write(&dir, "admin.yaml", CANDIDATE),
            old: None,
            operation: CheckOperation::Update,
        };

        let result = evaluate(&admission(vec![]), &RequestContext::background(), &args).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_read_object_rejects_missing_file() {
        assert!(read_object(Path::new("/nonexistent/admin.yaml")).is_err());
    }
}
