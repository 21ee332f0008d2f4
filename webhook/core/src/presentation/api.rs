// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Validating webhook HTTP endpoint.
//!
//! Decodes an `AdmissionReview`, dispatches on the operation to the
//! `PlatformAdminAdmission` use case and answers with a review carrying the
//! decision. Denials are normal `200 OK` responses with `allowed: false`; only
//! a body that is not an AdmissionReview at all gets a `400`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::application::admission::PlatformAdminAdmission;
use crate::domain::admission::{AdmissionError, RequestContext, Warnings};
use crate::domain::platform_admin::{RuntimeObject, TypeMeta};
use crate::presentation::review::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, Operation,
};

pub const VALIDATE_PLATFORM_ADMIN_PATH: &str = "/validate-iot-openyurt-io-platformadmin";

pub struct AppState {
    pub admission: Arc<dyn PlatformAdminAdmission>,
    pub request_timeout: Duration,
    /// Cancelled on server shutdown; in-flight catalog reads fail closed
    pub shutdown: CancellationToken,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(VALIDATE_PLATFORM_ADMIN_PATH, post(validate_platform_admin))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn validate_platform_admin(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdmissionReview>, JsonRejection>,
) -> Result<Json<AdmissionReview>, (StatusCode, Json<Value>)> {
    let Json(review) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected malformed AdmissionReview body");
        (StatusCode::BAD_REQUEST, Json(json!({ "error": rejection.body_text() })))
    })?;

    let api_version = review.api_version;
    let request = review.request.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "AdmissionReview has no request" })),
        )
    })?;

    debug!(
        uid = %request.uid,
        operation = request.operation.as_str(),
        name = %request.name,
        "Reviewing PlatformAdmin admission"
    );

    let ctx = RequestContext::with_timeout(state.request_timeout).with_parent(&state.shutdown);
    let uid = request.uid.clone();
    let result = dispatch(state.admission.as_ref(), &ctx, request).await;

    Ok(Json(AdmissionReview::respond(
        api_version,
        AdmissionResponse::from_result(uid, result),
    )))
}

async fn dispatch(
    admission: &dyn PlatformAdminAdmission,
    ctx: &RequestContext,
    request: AdmissionRequest,
) -> Result<Warnings, AdmissionError> {
    match request.operation {
        Operation::Create => {
            let obj = decode(request.object)?;
            admission.validate_create(ctx, &obj).await
        }
        Operation::Update => {
            let new_obj = decode(request.object)?;
            let old_obj = decode(request.old_object)?;
            admission.validate_update(ctx, &old_obj, &new_obj).await
        }
        Operation::Delete => {
            // The deleted object is not inspected; a missing or odd oldObject is fine.
            let obj = request
                .old_object
                .and_then(|v| RuntimeObject::from_value(v).ok())
                .unwrap_or_else(|| RuntimeObject::Other(TypeMeta::default()));
            admission.validate_delete(ctx, &obj).await
        }
        Operation::Connect => Ok(Warnings::new()),
    }
}

fn decode(raw: Option<Value>) -> Result<RuntimeObject, AdmissionError> {
    let raw = raw.ok_or_else(|| AdmissionError::BadRequest("there is no content to decode".into()))?;
    RuntimeObject::from_value(raw)
        .map_err(|e| AdmissionError::BadRequest(format!("failed to decode object: {}", e)))
}
