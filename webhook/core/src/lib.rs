// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Admission validation keeping each NodePool claimed by at most one
//! PlatformAdmin.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, validation service, catalog adapters and the
//!   webhook HTTP endpoint

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
