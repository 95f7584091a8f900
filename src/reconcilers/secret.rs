// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - mirrors tenant secrets into the backing cluster.
//!
//! Every request is handled by re-reading the backing secret and comparing it
//! with the snapshot carried by the request, so duplicate or stale deliveries
//! collapse into no-ops instead of depending on event order.

use crate::constants::DELETION_POLICY;
use crate::conversion::{build_backing_secret, decide, to_backing_namespace, Decision};
use crate::error::{Result, SyncerError};
use crate::kubernetes::StoreClient;
use crate::types::{bound_service_account, is_sync_skipped, EventKind, ReconcileRequest, ReconcileResult, SecretKind};
use k8s_openapi::api::core::v1::Secret;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub struct SecretReconciler {
    store: Arc<dyn StoreClient>,
}

impl SecretReconciler {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Reconcile one change notification.
    ///
    /// An error always means the request should be delivered again.
    #[instrument(
        skip(self, request),
        fields(
            cluster = %request.cluster,
            namespace = %request.namespace,
            name = %request.name,
            event = %request.event
        )
    )]
    pub async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileResult> {
        info!("Reconciling secret");

        let outcome = match request.event {
            EventKind::Created => self.reconcile_create(request).await,
            EventKind::Updated => self.reconcile_update(request).await,
            EventKind::Deleted => self.reconcile_remove(request).await,
        };

        match outcome {
            Ok(()) => Ok(ReconcileResult::done()),
            Err(e) => {
                error!("Failed to reconcile secret {} event: {}", request.event, e);
                Err(e)
            }
        }
    }

    async fn reconcile_create(&self, request: &ReconcileRequest) -> Result<()> {
        if is_sync_skipped(&request.object) {
            info!("Secret opted out of syncing, skipping");
            return Ok(());
        }

        match SecretKind::of(&request.object) {
            // The platform provisions token secrets itself, so there is nothing to create
            SecretKind::ServiceAccountToken => self.reconcile_token(request).await,
            SecretKind::Default => self.reconcile_default_create(request).await,
        }
    }

    async fn reconcile_update(&self, request: &ReconcileRequest) -> Result<()> {
        if is_sync_skipped(&request.object) {
            info!("Secret opted out of syncing, skipping");
            return Ok(());
        }

        match SecretKind::of(&request.object) {
            SecretKind::ServiceAccountToken => self.reconcile_token(request).await,
            SecretKind::Default => self.reconcile_default_update(request).await,
        }
    }

    async fn reconcile_default_create(&self, request: &ReconcileRequest) -> Result<()> {
        let target_namespace = to_backing_namespace(&request.cluster, &request.namespace);

        if self.store.get(&target_namespace, &request.name).await?.is_some() {
            debug!("Backing secret already exists in {}, comparing instead", target_namespace);
            return self.reconcile_default_update(request).await;
        }

        let secret = build_backing_secret(&request.cluster, &target_namespace, &request.object);
        match self.store.create(&secret).await {
            Ok(_) => {
                info!("Created backing secret {}/{}", target_namespace, request.name);
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                info!(
                    "Backing secret {}/{} already exists, leaving it to the next update",
                    target_namespace, request.name
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reconcile_default_update(&self, request: &ReconcileRequest) -> Result<()> {
        let target_namespace = to_backing_namespace(&request.cluster, &request.namespace);

        let Some(current) = self.store.get(&target_namespace, &request.name).await? else {
            info!(
                "Backing secret {}/{} not found, nothing to update",
                target_namespace, request.name
            );
            return Ok(());
        };

        self.apply(&current, &request.object, SecretKind::Default).await
    }

    async fn reconcile_token(&self, request: &ReconcileRequest) -> Result<()> {
        let target_namespace = to_backing_namespace(&request.cluster, &request.namespace);

        let service_account = bound_service_account(&request.object).ok_or_else(|| {
            SyncerError::ServiceAccountLookup(format!(
                "token secret {}/{} is not bound to a service account",
                request.namespace, request.name
            ))
        })?;

        let current = self
            .store
            .find_service_account_token(&target_namespace, service_account)
            .await?
            .ok_or_else(|| {
                SyncerError::ServiceAccountLookup(format!(
                    "no token secret for service account {} in {}",
                    service_account, target_namespace
                ))
            })?;

        self.apply(&current, &request.object, SecretKind::ServiceAccountToken)
            .await
    }

    /// Write the merged secret if the evaluator asks for it
    async fn apply(&self, current: &Secret, desired: &Secret, kind: SecretKind) -> Result<()> {
        let current_ref = format!(
            "{}/{}",
            current.metadata.namespace.as_deref().unwrap_or_default(),
            current.metadata.name.as_deref().unwrap_or_default()
        );

        let updated = match decide(current, desired, kind) {
            Decision::NoChange => {
                debug!("Backing secret {} is up to date", current_ref);
                return Ok(());
            }
            Decision::Update(updated) => updated,
        };

        match self.store.update(&updated).await {
            Ok(_) => {
                info!("Updated backing secret {}", current_ref);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!("Backing secret {} disappeared before update", current_ref);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn reconcile_remove(&self, request: &ReconcileRequest) -> Result<()> {
        let target_namespace = to_backing_namespace(&request.cluster, &request.namespace);

        match self
            .store
            .delete(&target_namespace, &request.name, DELETION_POLICY)
            .await
        {
            Ok(()) => {
                info!("Deleted backing secret {}/{}", target_namespace, request.name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    "Backing secret {}/{} is already gone",
                    target_namespace, request.name
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
