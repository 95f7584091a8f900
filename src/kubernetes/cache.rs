// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backing-cluster secret cache and its startup readiness gate

use crate::error::{Result, SyncerError};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{
        reflector::{self, Store},
        watcher, WatchStreamExt,
    },
    Api, Client,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Keep a reflector cache of every secret in the backing cluster up to date.
pub async fn run_backing_cache(client: Client, writer: reflector::store::Writer<Secret>) -> anyhow::Result<()> {
    let secrets: Api<Secret> = Api::all(client);
    let stream = watcher(secrets, WatcherConfig::default()).default_backoff();

    reflector::reflector(writer, stream)
        .for_each(|event| async move {
            match event {
                Ok(watcher::Event::InitDone) => info!("Backing secret cache populated"),
                Ok(_) => {}
                Err(e) => warn!("Backing secret watch error: {}", e),
            }
        })
        .await;

    Ok(())
}

/// Wait until the cache has completed its initial listing.
///
/// Not reaching readiness within `limit` is fatal for startup.
pub async fn wait_for_cache_sync(cache: &Store<Secret>, limit: Duration) -> Result<()> {
    debug!("Waiting up to {:?} for the backing secret cache to sync", limit);

    match timeout(limit, cache.wait_until_ready()).await {
        Ok(Ok(())) => {
            info!("Backing secret cache synced");
            Ok(())
        }
        Ok(Err(e)) => Err(SyncerError::CacheSync(format!("cache writer stopped: {}", e))),
        Err(_) => Err(SyncerError::CacheSync(format!(
            "cache not populated within {:?}",
            limit
        ))),
    }
}
