// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod validation_service;
pub mod admission;
pub mod catalog_factory;

// Re-export use cases for convenience
pub use admission::{PlatformAdminAdmission, StandardPlatformAdminAdmission};
pub use catalog_factory::{create_catalogs, Catalogs};
pub use validation_service::PlatformAdminValidator;
