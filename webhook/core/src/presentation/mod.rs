// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`poolguard-core`)
//!
//! HTTP surface that translates AdmissionReview requests into application
//! service calls. **No business logic lives here**; all decisions are
//! delegated to `crate::application`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Axum router: validating webhook endpoint and health check |
//! | [`review`] | `admission.k8s.io/v1` AdmissionReview wire types |

pub mod api;
pub mod review;
