// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Request and object-kind types shared by the event source and reconciler.

pub mod request;
pub mod secret;

pub use request::{EventKind, ReconcileRequest, ReconcileResult, RequestKey};
pub use secret::{bound_service_account, is_sync_skipped, SecretKind};
