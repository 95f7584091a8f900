// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pure tenant-to-backing conversions: namespace mapping, materialization and merge decisions.

pub mod equality;
pub mod materialize;
pub mod namespace;

pub use equality::{decide, Decision};
pub use materialize::build_backing_secret;
pub use namespace::to_backing_namespace;
