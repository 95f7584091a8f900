// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcilers that drive backing objects toward their tenant state.

pub mod secret;

pub use secret::SecretReconciler;
