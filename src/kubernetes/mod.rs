// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes plumbing: backing store access, its cache, and tenant client creation.

pub mod cache;
pub mod client;
pub mod store;

pub use cache::{run_backing_cache, wait_for_cache_sync};
pub use client::create_tenant_client;
pub use store::{KubeSecretStore, StoreClient};
