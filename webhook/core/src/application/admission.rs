// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! PlatformAdmin Admission Use Case
//!
//! Create/update/delete handlers invoked once per admission request.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Type-check the inbound objects and turn validation
//!   results into an accept/reject decision
//! - **Collaborators:** `PlatformAdminValidator`
//!
//! # Decisions
//!
//! | Operation | Validated | Rejects when |
//! |-----------|-----------|--------------|
//! | Create | new object | its `ErrorList` is non-empty |
//! | Update | new and old, independently | the concatenation (new first) is non-empty |
//! | Delete | nothing | never |
//!
//! Update re-checks the previous state too, so an object that has become
//! invalid cannot be carried forward by an unrelated edit.

use async_trait::async_trait;
use tracing::info;

use crate::application::validation_service::PlatformAdminValidator;
use crate::domain::admission::{AdmissionError, RequestContext, Warnings};
use crate::domain::platform_admin::{PlatformAdmin, RuntimeObject};

#[async_trait]
pub trait PlatformAdminAdmission: Send + Sync {
    async fn validate_create(
        &self,
        ctx: &RequestContext,
        obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError>;

    async fn validate_update(
        &self,
        ctx: &RequestContext,
        old_obj: &RuntimeObject,
        new_obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError>;

    async fn validate_delete(
        &self,
        ctx: &RequestContext,
        obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError>;
}

/// Reject anything that is not a PlatformAdmin before any validation runs
pub fn expect_platform_admin(obj: &RuntimeObject) -> Result<&PlatformAdmin, AdmissionError> {
    match obj {
        RuntimeObject::PlatformAdmin(admin) => Ok(admin.as_ref()),
        other => Err(AdmissionError::BadRequest(format!(
            "expected a PlatformAdmin but got a {}",
            other.type_meta()
        ))),
    }
}

fn record(operation: &'static str, allowed: bool) {
    metrics::counter!(
        "poolguard_admission_requests_total",
        "operation" => operation,
        "allowed" => if allowed { "true" } else { "false" }
    )
    .increment(1);
}

pub struct StandardPlatformAdminAdmission {
    validator: PlatformAdminValidator,
}

impl StandardPlatformAdminAdmission {
    pub fn new(validator: PlatformAdminValidator) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl PlatformAdminAdmission for StandardPlatformAdminAdmission {
    async fn validate_create(
        &self,
        ctx: &RequestContext,
        obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError> {
        let admin = expect_platform_admin(obj)?;

        let errs = self.validator.validate(ctx, admin).await;
        if !errs.is_empty() {
            info!(platform_admin = admin.name(), errors = errs.len(), "Rejected PlatformAdmin create");
            record("create", false);
            return Err(AdmissionError::invalid_platform_admin(admin.name(), errs));
        }

        record("create", true);
        Ok(Warnings::new())
    }

    async fn validate_update(
        &self,
        ctx: &RequestContext,
        old_obj: &RuntimeObject,
        new_obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError> {
        let new_admin = expect_platform_admin(new_obj)?;
        let old_admin = expect_platform_admin(old_obj)?;

        let mut errs = self.validator.validate(ctx, new_admin).await;
        errs.extend(self.validator.validate(ctx, old_admin).await);
        if !errs.is_empty() {
            info!(platform_admin = new_admin.name(), errors = errs.len(), "Rejected PlatformAdmin update");
            record("update", false);
            return Err(AdmissionError::invalid_platform_admin(new_admin.name(), errs));
        }

        record("update", true);
        Ok(Warnings::new())
    }

    async fn validate_delete(
        &self,
        _ctx: &RequestContext,
        _obj: &RuntimeObject,
    ) -> Result<Warnings, AdmissionError> {
        record("delete", true);
        Ok(Warnings::new())
    }
}
