// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::reflector;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tenant_syncer::config::Config;
use tenant_syncer::kubernetes::{
    create_tenant_client, run_backing_cache, wait_for_cache_sync, KubeSecretStore,
};
use tenant_syncer::reconcilers::SecretReconciler;
use tenant_syncer::sync::{Backoff, SyncManager, TenantWatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting tenant secret syncer");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: cluster_id={}", config.cluster_id);

    // Create Kubernetes clients
    let backing_client = Client::try_default().await?;
    info!("Connected to backing cluster");
    let tenant_client = create_tenant_client(&backing_client, &config).await?;
    info!("Connected to tenant cluster {}", config.cluster_id);

    // Backing secrets are read from this cache, written through the API
    let (backing_cache, backing_writer) = reflector::store::<Secret>();
    let store = KubeSecretStore::new(backing_client.clone(), backing_cache.clone());
    let reconciler = SecretReconciler::new(Arc::new(store));

    let (tenant_cache, tenant_writer) = reflector::store::<Secret>();
    let (sync_manager, sync_handle) = SyncManager::new(
        reconciler,
        Backoff::from_config(&config),
        Some(tenant_cache.clone()),
    );
    let tenant_watcher = TenantWatcher::new(
        tenant_client,
        config.cluster_id.clone(),
        tenant_cache,
        tenant_writer,
        sync_handle,
    );

    let dispatcher = async {
        wait_for_cache_sync(&backing_cache, config.cache_sync_timeout)
            .await
            .context("backing secret cache did not sync")?;
        sync_manager
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await
    };

    info!("Starting watchers...");

    // The dispatcher is the only task that returns on shutdown
    tokio::select! {
        result = dispatcher => result?,
        result = run_backing_cache(backing_client, backing_writer) => {
            result?;
            warn!("Backing secret cache stopped unexpectedly");
        }
        result = tenant_watcher.run() => {
            result?;
            warn!("Tenant secret watcher stopped unexpectedly");
        }
    }

    info!("Tenant secret syncer stopped");
    Ok(())
}
