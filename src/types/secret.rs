// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, SERVICE_ACCOUNT_TOKEN_TYPE};
use k8s_openapi::api::core::v1::Secret;

/// Merge policy family of a secret, derived from its `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// Fully tenant specified; the backing copy mirrors it
    Default,
    /// Payload partially populated by the platform's token controller
    ServiceAccountToken,
}

impl SecretKind {
    pub fn of(secret: &Secret) -> Self {
        match secret.type_.as_deref() {
            Some(SERVICE_ACCOUNT_TOKEN_TYPE) => SecretKind::ServiceAccountToken,
            _ => SecretKind::Default,
        }
    }
}

/// Name of the service account a token secret is bound to
pub fn bound_service_account(secret: &Secret) -> Option<&str> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::SERVICE_ACCOUNT_NAME))
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
}

/// Check if a tenant secret opted out of mirroring
pub fn is_sync_skipped(secret: &Secret) -> bool {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::SKIP))
        .is_some_and(|v| v == "true")
}
