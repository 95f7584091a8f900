// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::error::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Backing store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Failed to load tenant kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Service account token lookup failed: {0}")]
    ServiceAccountLookup(String),

    #[error("Cache sync failed: {0}")]
    CacheSync(String),
}

pub type Result<T> = std::result::Result<T, SyncerError>;

/// Failures of the backing store, classified the way the reconciler
/// needs to tell benign races from real errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("{namespace}/{name} already exists")]
    AlreadyExists { namespace: String, name: String },

    #[error("secret {0} has no namespace")]
    MissingNamespace(String),

    #[error("Kubernetes API error: {0}")]
    Api(kube::Error),
}

impl StoreError {
    /// Classify a kube error returned for the object at `namespace/name`
    pub fn classify(err: kube::Error, namespace: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ErrorResponse { code: 404, .. }) => StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            kube::Error::Api(ErrorResponse { code: 409, ref reason, .. })
                if reason == "AlreadyExists" =>
            {
                StoreError::AlreadyExists {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }
            }
            other => StoreError::Api(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_classify_not_found() {
        let err = StoreError::classify(api_error(404, "NotFound"), "c1-acme", "db-cred");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "c1-acme/db-cred not found");
    }

    #[test]
    fn test_classify_already_exists() {
        let err = StoreError::classify(api_error(409, "AlreadyExists"), "c1-acme", "db-cred");
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_classify_update_conflict_is_not_benign() {
        let err = StoreError::classify(api_error(409, "Conflict"), "c1-acme", "db-cred");
        assert!(!err.is_already_exists());
        assert!(!err.is_not_found());
        assert!(matches!(err, StoreError::Api(_)));
    }

    #[test]
    fn test_classify_server_error() {
        let err = StoreError::classify(api_error(500, "InternalError"), "c1-acme", "db-cred");
        assert!(matches!(err, StoreError::Api(_)));
    }
}
