// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, labels, sync_status, PREFIX};
use k8s_openapi::api::core::v1::Secret;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Build a new backing secret from a tenant secret.
///
/// Only the payload and the tenant's own labels and annotations are copied.
/// Server populated metadata is left empty so the backing cluster assigns it.
pub fn build_backing_secret(cluster: &str, backing_namespace: &str, tenant: &Secret) -> Secret {
    let mut annotations = tenant_entries(tenant.metadata.annotations.as_ref());
    annotations.insert(annotations::CLUSTER.to_string(), cluster.to_string());
    annotations.insert(
        annotations::NAMESPACE.to_string(),
        tenant.metadata.namespace.clone().unwrap_or_default(),
    );
    if let Some(uid) = &tenant.metadata.uid {
        annotations.insert(annotations::UID.to_string(), uid.clone());
    }
    if let Some(refs) = tenant.metadata.owner_references.as_ref().filter(|r| !r.is_empty()) {
        if let Ok(encoded) = serde_json::to_string(refs) {
            annotations.insert(annotations::OWNER_REFERENCES.to_string(), encoded);
        }
    }

    let mut labels = tenant_entries(tenant.metadata.labels.as_ref());
    labels.insert(labels::SYNC_STATUS.to_string(), sync_status::PENDING.to_string());

    Secret {
        metadata: ObjectMeta {
            name: tenant.metadata.name.clone(),
            namespace: Some(backing_namespace.to_string()),
            labels: Some(labels),
            annotations: Some(annotations),
            ..Default::default()
        },
        data: tenant.data.clone(),
        string_data: tenant.string_data.clone(),
        type_: tenant.type_.clone(),
        immutable: tenant.immutable,
    }
}

/// Entries of a tenant label or annotation map, minus keys the syncer owns
pub(crate) fn tenant_entries(map: Option<&BTreeMap<String, String>>) -> BTreeMap<String, String> {
    map.map(|m| {
        m.iter()
            .filter(|(k, _)| !k.starts_with(PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    })
    .unwrap_or_default()
}
