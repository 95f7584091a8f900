// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merge decisions between a backing secret and the tenant secret it mirrors.
//!
//! Only fields a tenant is allowed to influence are ever compared or written.
//! Everything else on the backing secret, in particular the syncer's own
//! labels and annotations, is carried over untouched.

use crate::constants::{labels, sync_status, PREFIX};
use crate::conversion::materialize::tenant_entries;
use crate::types::SecretKind;
use k8s_openapi::api::core::v1::Secret;
use std::collections::BTreeMap;

/// Result of comparing a backing secret with its desired state
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Write this secret to the backing cluster
    Update(Secret),
    NoChange,
}

/// A field of a secret that tenants control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantField {
    Data,
    StringData,
    /// Labels outside the syncer's prefix
    Labels,
    /// Annotations outside the syncer's prefix
    Annotations,
    /// Absent counts as mutable
    Immutable,
}

/// Fields compared for secrets that are fully tenant specified
pub const DEFAULT_FIELDS: &[TenantField] = &[
    TenantField::Data,
    TenantField::StringData,
    TenantField::Labels,
    TenantField::Annotations,
    TenantField::Immutable,
];

/// Fields compared for service account tokens; the platform owns the rest
pub const TOKEN_FIELDS: &[TenantField] = &[TenantField::Data];

/// Decide whether `current` must be rewritten to match `desired`.
pub fn decide(current: &Secret, desired: &Secret, kind: SecretKind) -> Decision {
    let mut updated = current.clone();
    let mut changed = false;

    let fields = match kind {
        SecretKind::Default => DEFAULT_FIELDS,
        SecretKind::ServiceAccountToken => {
            if sync_status_of(current) != Some(sync_status::READY) {
                updated
                    .metadata
                    .labels
                    .get_or_insert_with(BTreeMap::new)
                    .insert(labels::SYNC_STATUS.to_string(), sync_status::READY.to_string());
                changed = true;
            }
            TOKEN_FIELDS
        }
    };

    for field in fields {
        if field.differs(current, desired) {
            field.adopt(&mut updated, desired);
            changed = true;
        }
    }

    if changed {
        Decision::Update(updated)
    } else {
        Decision::NoChange
    }
}

fn sync_status_of(secret: &Secret) -> Option<&str> {
    secret
        .metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(labels::SYNC_STATUS))
        .map(|s| s.as_str())
}

impl TenantField {
    fn differs(self, current: &Secret, desired: &Secret) -> bool {
        match self {
            TenantField::Data => !same_map(current.data.as_ref(), desired.data.as_ref()),
            TenantField::StringData => {
                !same_map(current.string_data.as_ref(), desired.string_data.as_ref())
            }
            TenantField::Labels => {
                tenant_entries(current.metadata.labels.as_ref())
                    != tenant_entries(desired.metadata.labels.as_ref())
            }
            TenantField::Annotations => {
                tenant_entries(current.metadata.annotations.as_ref())
                    != tenant_entries(desired.metadata.annotations.as_ref())
            }
            TenantField::Immutable => {
                current.immutable.unwrap_or(false) != desired.immutable.unwrap_or(false)
            }
        }
    }

    fn adopt(self, target: &mut Secret, desired: &Secret) {
        match self {
            TenantField::Data => target.data = desired.data.clone(),
            TenantField::StringData => target.string_data = desired.string_data.clone(),
            TenantField::Labels => {
                target.metadata.labels = merge_owned(
                    target.metadata.labels.as_ref(),
                    desired.metadata.labels.as_ref(),
                )
            }
            TenantField::Annotations => {
                target.metadata.annotations = merge_owned(
                    target.metadata.annotations.as_ref(),
                    desired.metadata.annotations.as_ref(),
                )
            }
            TenantField::Immutable => target.immutable = desired.immutable,
        }
    }
}

/// Absent and empty maps compare equal
fn same_map<V: PartialEq>(a: Option<&BTreeMap<String, V>>, b: Option<&BTreeMap<String, V>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (Some(m), None) | (None, Some(m)) => m.is_empty(),
        (None, None) => true,
    }
}

/// Keep the syncer-owned entries of `backing` and take everything else from `tenant`
fn merge_owned(
    backing: Option<&BTreeMap<String, String>>,
    tenant: Option<&BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    let mut merged = tenant_entries(tenant);
    if let Some(backing) = backing {
        merged.extend(
            backing
                .iter()
                .filter(|(k, _)| k.starts_with(PREFIX))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }
    (!merged.is_empty()).then_some(merged)
}
