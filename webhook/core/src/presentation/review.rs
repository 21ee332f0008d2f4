// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `admission.k8s.io/v1` AdmissionReview wire types.
//!
//! Only the fields the webhook reads or writes are modelled.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::admission::{AdmissionError, Warnings};
use crate::domain::field::FIELD_VALUE_INVALID;

pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionReview {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl AdmissionReview {
    /// Wrap a response in a review echoing the request's apiVersion
    pub fn respond(api_version: String, response: AdmissionResponse) -> Self {
        Self {
            api_version,
            kind: ADMISSION_REVIEW_KIND.to_string(),
            request: None,
            response: Some(response),
        }
    }
}

fn default_api_version() -> String {
    ADMISSION_API_VERSION.to_string()
}

fn default_kind() -> String {
    ADMISSION_REVIEW_KIND.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,

    #[serde(default)]
    pub kind: GroupVersionKind,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub operation: Operation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionResponse {
    pub uid: String,

    pub allowed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AdmissionResponse {
    pub fn allowed(uid: impl Into<String>, warnings: Warnings) -> Self {
        Self {
            uid: uid.into(),
            allowed: true,
            status: None,
            warnings,
        }
    }

    pub fn denied(uid: impl Into<String>, err: &AdmissionError) -> Self {
        Self {
            uid: uid.into(),
            allowed: false,
            status: Some(Status::from(err)),
            warnings: vec![],
        }
    }

    pub fn from_result(uid: impl Into<String>, result: Result<Warnings, AdmissionError>) -> Self {
        match result {
            Ok(warnings) => Self::allowed(uid, warnings),
            Err(err) => Self::denied(uid, &err),
        }
    }
}

/// `meta/v1` Status carried by a denied response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
    pub message: String,
    pub reason: String,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDetails {
    pub name: String,
    pub group: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<StatusCause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCause {
    pub reason: String,
    pub message: String,
    pub field: String,
}

impl From<&AdmissionError> for Status {
    fn from(err: &AdmissionError) -> Self {
        let details = match err {
            AdmissionError::BadRequest(_) => None,
            AdmissionError::Invalid { group_kind, name, errors } => Some(StatusDetails {
                name: name.clone(),
                group: group_kind.group.clone(),
                kind: group_kind.kind.clone(),
                causes: errors
                    .iter()
                    .map(|e| StatusCause {
                        reason: FIELD_VALUE_INVALID.to_string(),
                        message: e.error_body(),
                        field: e.field.clone(),
                    })
                    .collect(),
            }),
        };

        Self {
            status: "Failure".to_string(),
            message: err.to_string(),
            reason: err.reason().to_string(),
            code: err.code(),
            details,
        }
    }
}
