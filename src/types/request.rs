// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::Secret;
use std::fmt;

/// Kind of change observed on a tenant secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Created => "CREATE",
            EventKind::Updated => "UPDATE",
            EventKind::Deleted => "DELETE",
        };
        f.write_str(s)
    }
}

/// A single change notification for a tenant secret
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub cluster: String,
    pub namespace: String,
    pub name: String,
    pub event: EventKind,
    /// Latest snapshot of the tenant secret carried by the notification
    pub object: Secret,
}

impl ReconcileRequest {
    pub fn new(cluster: impl Into<String>, event: EventKind, object: Secret) -> Self {
        Self {
            cluster: cluster.into(),
            namespace: object.metadata.namespace.clone().unwrap_or_default(),
            name: object.metadata.name.clone().unwrap_or_default(),
            event,
            object,
        }
    }

    pub fn key(&self) -> RequestKey {
        RequestKey {
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity of a tenant secret across clusters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub cluster: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.cluster, self.namespace, self.name)
    }
}

/// Outcome of a successful reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Ask the dispatcher to deliver the request again with backoff
    pub requeue: bool,
}

impl ReconcileResult {
    pub fn done() -> Self {
        Self { requeue: false }
    }
}
