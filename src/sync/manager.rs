// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher between the tenant event source and the secret reconciler.

use crate::config::Config;
use crate::constants::defaults::QUEUE_CAPACITY;
use crate::reconcilers::SecretReconciler;
use crate::types::{EventKind, ReconcileRequest, RequestKey};
use k8s_openapi::api::core::v1::Secret;
use kube::runtime::reflector::{ObjectRef, Store};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Exponential requeue delay, capped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Backoff {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base: config.requeue_base_delay,
            max: config.requeue_max_delay,
        }
    }

    /// Delay before the next attempt after `failures` consecutive failures
    pub fn delay(&self, failures: u32) -> Duration {
        self.base
            .saturating_mul(2u32.saturating_pow(failures))
            .min(self.max)
    }
}

/// Processes reconcile requests one at a time, so a key is never reconciled
/// concurrently with itself. Failed requests are delivered again later.
pub struct SyncManager {
    reconciler: SecretReconciler,
    backoff: Backoff,
    request_rx: mpsc::Receiver<ReconcileRequest>,
    request_tx: mpsc::WeakSender<ReconcileRequest>,
    /// Tenant secrets as last seen, used to refresh requeued requests
    tenant_cache: Option<Store<Secret>>,
    failures: HashMap<RequestKey, u32>,
}

/// Handle to send requests to the SyncManager
#[derive(Clone)]
pub struct SyncManagerHandle {
    request_tx: mpsc::Sender<ReconcileRequest>,
}

impl SyncManagerHandle {
    pub async fn send(&self, request: ReconcileRequest) {
        if let Err(e) = self.request_tx.send(request).await {
            error!("Failed to send request to SyncManager: {}", e);
        }
    }
}

impl SyncManager {
    pub fn new(
        reconciler: SecretReconciler,
        backoff: Backoff,
        tenant_cache: Option<Store<Secret>>,
    ) -> (Self, SyncManagerHandle) {
        let (request_tx, request_rx) = mpsc::channel(QUEUE_CAPACITY);

        let manager = Self {
            reconciler,
            backoff,
            request_rx,
            request_tx: request_tx.downgrade(),
            tenant_cache,
            failures: HashMap::new(),
        };

        let handle = SyncManagerHandle { request_tx };
        (manager, handle)
    }

    /// Process requests until `shutdown` resolves or every handle is dropped.
    ///
    /// A request already being reconciled when `shutdown` fires runs to completion.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        info!("SyncManager started, listening for requests...");
        tokio::pin!(shutdown);

        loop {
            let request = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting requests");
                    break;
                }
                request = self.request_rx.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };
            self.handle_request(request).await;
        }

        info!("SyncManager stopped");
        Ok(())
    }

    async fn handle_request(&mut self, request: ReconcileRequest) {
        let key = request.key();

        match self.reconciler.reconcile(&request).await {
            Ok(result) if !result.requeue => {
                self.failures.remove(&key);
            }
            Ok(_) => {
                debug!("Reconciler asked to requeue {}", key);
                self.requeue(key, request);
            }
            Err(e) => {
                warn!("Requeueing {} after error: {}", key, e);
                self.requeue(key, request);
            }
        }
    }

    fn requeue(&mut self, key: RequestKey, request: ReconcileRequest) {
        let failures = self.failures.entry(key.clone()).or_insert(0);
        let delay = self.backoff.delay(*failures);
        *failures = failures.saturating_add(1);

        let Some(request_tx) = self.request_tx.upgrade() else {
            warn!("Request channel closed, dropping {}", key);
            return;
        };
        let tenant_cache = self.tenant_cache.clone();

        debug!("Retrying {} in {:?}", key, delay);
        tokio::spawn(async move {
            sleep(delay).await;

            let request = match &tenant_cache {
                Some(cache) => {
                    let current = cache.get(&ObjectRef::new(&request.name).within(&request.namespace));
                    refresh(request, current)
                }
                None => Some(request),
            };

            match request {
                Some(request) => {
                    if let Err(e) = request_tx.send(request).await {
                        error!("Failed to requeue {}: {}", key, e);
                    }
                }
                None => debug!("Dropping requeue of {}, superseded by a newer event", key),
            }
        });
    }
}

/// Bring a requeued request up to date with the tenant secret as it is now.
///
/// Returns `None` when a later event made the request obsolete.
pub fn refresh(request: ReconcileRequest, current: Option<Arc<Secret>>) -> Option<ReconcileRequest> {
    match (request.event, current) {
        (EventKind::Deleted, None) => Some(request),
        // Recreated since; its own Created event takes over
        (EventKind::Deleted, Some(_)) => None,
        // Deleted since; its Deleted event takes over
        (_, None) => None,
        (_, Some(latest)) => Some(ReconcileRequest {
            object: (*latest).clone(),
            ..request
        }),
    }
}
