// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! API object model, field errors, admission outcomes, catalog interfaces
//! and the webhook configuration schema. No I/O lives here.

pub mod platform_admin;
pub mod field;
pub mod admission;
pub mod catalog;
pub mod webhook_config;
