// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Prefix shared by every label and annotation the syncer owns
pub const PREFIX: &str = "tenant-syncer.io/";

/// Label keys set on backing secrets
pub mod labels {
    /// Synchronization status of a backing secret
    pub const SYNC_STATUS: &str = "tenant-syncer.io/sync-status";
}

/// Values of the sync-status label
pub mod sync_status {
    pub const PENDING: &str = "pending";
    pub const READY: &str = "ready";
}

/// Annotation keys used by the syncer
pub mod annotations {
    /// When set to "true" on a tenant secret, it is not mirrored
    pub const SKIP: &str = "tenant-syncer.io/skip";
    /// Tenant cluster a backing secret originates from
    pub const CLUSTER: &str = "tenant-syncer.io/cluster";
    /// Tenant namespace a backing secret originates from
    pub const NAMESPACE: &str = "tenant-syncer.io/namespace";
    /// UID of the originating tenant secret
    pub const UID: &str = "tenant-syncer.io/uid";
    /// JSON encoded owner references of the originating tenant secret
    pub const OWNER_REFERENCES: &str = "tenant-syncer.io/owner-references";
    /// Service account a token secret is bound to
    pub const SERVICE_ACCOUNT_NAME: &str = "kubernetes.io/service-account.name";
}

/// Secret type populated by the platform's token controller
pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";

/// Field manager name used for writes
pub const OPERATOR_NAME: &str = "tenant-syncer";

/// Key holding the tenant admin kubeconfig in its backing secret
pub const KUBECONFIG_KEY: &str = "admin-kubeconfig";

/// Maximum length of a namespace name (DNS-1123 label)
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Requeue and startup defaults
pub mod defaults {
    pub const CACHE_SYNC_TIMEOUT_SECS: u64 = 120;
    pub const REQUEUE_BASE_DELAY_SECS: u64 = 1;
    pub const REQUEUE_MAX_DELAY_SECS: u64 = 300;
    /// Capacity of the request channel between event source and dispatcher
    pub const QUEUE_CAPACITY: usize = 256;
}

/// Propagation policy applied when deleting backing secrets
pub const DELETION_POLICY: kube::api::PropagationPolicy = kube::api::PropagationPolicy::Background;
