// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant event source - watches tenant secrets and emits reconcile requests.

use crate::sync::SyncManagerHandle;
use crate::types::{EventKind, ReconcileRequest};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{
        reflector::{store::Writer, ObjectRef, Store},
        watcher, WatchStreamExt,
    },
    Api, Client,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Turns watch events into reconcile requests.
///
/// Must see each event before it is applied to the tenant cache, since the
/// cache's previous contents decide between Created and Updated.
pub struct EventTranslator {
    cluster: String,
    known: Store<Secret>,
    /// Keys listed so far during a (re)list
    relist: Option<HashSet<ObjectRef<Secret>>>,
}

impl EventTranslator {
    pub fn new(cluster: impl Into<String>, known: Store<Secret>) -> Self {
        Self {
            cluster: cluster.into(),
            known,
            relist: None,
        }
    }

    pub fn translate(&mut self, event: &watcher::Event<Secret>) -> Vec<ReconcileRequest> {
        match event {
            watcher::Event::Init => {
                self.relist = Some(HashSet::new());
                Vec::new()
            }
            watcher::Event::InitApply(secret) => {
                let key = ObjectRef::from_obj(secret);
                let kind = self.kind_for(&key);
                if let Some(seen) = self.relist.as_mut() {
                    seen.insert(key);
                }
                vec![self.request(kind, secret)]
            }
            watcher::Event::InitDone => {
                // Secrets deleted while the watch was down never get a Delete event
                let seen = self.relist.take().unwrap_or_default();
                self.known
                    .state()
                    .into_iter()
                    .filter(|s| !seen.contains(&ObjectRef::from_obj(&**s)))
                    .map(|s| self.request(EventKind::Deleted, &s))
                    .collect()
            }
            watcher::Event::Apply(secret) => {
                let kind = self.kind_for(&ObjectRef::from_obj(secret));
                vec![self.request(kind, secret)]
            }
            watcher::Event::Delete(secret) => vec![self.request(EventKind::Deleted, secret)],
        }
    }

    fn kind_for(&self, key: &ObjectRef<Secret>) -> EventKind {
        if self.known.get(key).is_some() {
            EventKind::Updated
        } else {
            EventKind::Created
        }
    }

    fn request(&self, event: EventKind, secret: &Secret) -> ReconcileRequest {
        ReconcileRequest::new(self.cluster.clone(), event, secret.clone())
    }
}

/// Watches every secret in a tenant cluster and feeds the sync manager
pub struct TenantWatcher {
    client: Client,
    cluster: String,
    cache: Store<Secret>,
    writer: Writer<Secret>,
    sync_handle: SyncManagerHandle,
}

impl TenantWatcher {
    pub fn new(
        client: Client,
        cluster: String,
        cache: Store<Secret>,
        writer: Writer<Secret>,
        sync_handle: SyncManagerHandle,
    ) -> Self {
        Self {
            client,
            cluster,
            cache,
            writer,
            sync_handle,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::all(self.client.clone());
        let mut translator = EventTranslator::new(self.cluster.clone(), self.cache.clone());
        let mut stream = watcher(secrets, WatcherConfig::default())
            .default_backoff()
            .boxed();

        info!("Watching secrets of tenant cluster {}", self.cluster);

        while let Some(event) = stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!("Tenant secret watch error: {}", e);
                    continue;
                }
            };

            let requests = translator.translate(&event);
            self.writer.apply_watcher_event(&event);

            for request in requests {
                debug!(
                    "Queueing {} for {}/{}",
                    request.event, request.namespace, request.name
                );
                self.sync_handle.send(request).await;
            }
        }

        Ok(())
    }
}
