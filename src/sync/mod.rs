// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event intake and dispatch of tenant secret changes.

pub mod manager;
pub mod source;

pub use manager::{Backoff, SyncManager, SyncManagerHandle};
pub use source::{EventTranslator, TenantWatcher};
