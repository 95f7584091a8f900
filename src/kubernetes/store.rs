// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access to secrets in the backing cluster.

use crate::constants::{annotations, OPERATOR_NAME, SERVICE_ACCOUNT_TOKEN_TYPE};
use crate::error::StoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{DeleteParams, PostParams, PropagationPolicy},
    runtime::reflector::{ObjectRef, Store},
    Api, Client, ResourceExt,
};
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

/// Reads and writes of backing-cluster secrets.
///
/// Reads may be served from a cache and be slightly stale. Writes go to the
/// API server and are the authority on conflicts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Cached lookup of a secret by namespace and name
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError>;

    /// Cached lookup of the token secret the platform issued for a service account
    async fn find_service_account_token(
        &self,
        namespace: &str,
        service_account: &str,
    ) -> Result<Option<Secret>, StoreError>;

    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError>;

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError>;

    async fn delete(
        &self,
        namespace: &str,
        name: &str,
        propagation: PropagationPolicy,
    ) -> Result<(), StoreError>;
}

/// Store client backed by a reflector cache and the backing cluster's API server
pub struct KubeSecretStore {
    client: Client,
    cache: Store<Secret>,
}

impl KubeSecretStore {
    pub fn new(client: Client, cache: Store<Secret>) -> Self {
        Self { client, cache }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..Default::default()
        }
    }
}

fn namespace_of(secret: &Secret) -> Result<String, StoreError> {
    secret
        .namespace()
        .ok_or_else(|| StoreError::MissingNamespace(secret.name_any()))
}

/// Check if a secret is a token issued for the given service account
pub fn is_token_for(secret: &Secret, service_account: &str) -> bool {
    secret.type_.as_deref() == Some(SERVICE_ACCOUNT_TOKEN_TYPE)
        && secret
            .annotations()
            .get(annotations::SERVICE_ACCOUNT_NAME)
            .is_some_and(|sa| sa == service_account)
}

#[async_trait]
impl StoreClient for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        let key = ObjectRef::new(name).within(namespace);
        Ok(self.cache.get(&key).map(|s| (*s).clone()))
    }

    async fn find_service_account_token(
        &self,
        namespace: &str,
        service_account: &str,
    ) -> Result<Option<Secret>, StoreError> {
        // Several tokens may exist for one account; pick by name so the choice is stable
        Ok(self
            .cache
            .state()
            .into_iter()
            .filter(|s| s.namespace().as_deref() == Some(namespace))
            .filter(|s| is_token_for(s, service_account))
            .min_by_key(|s| s.name_any())
            .map(|s| (*s).clone()))
    }

    #[instrument(skip(self, secret), fields(secret = %format!("{}/{}", secret.namespace().unwrap_or_default(), secret.name_any())))]
    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = namespace_of(secret)?;
        let name = secret.name_any();
        debug!("Creating backing secret");
        self.api(&namespace)
            .create(&Self::post_params(), secret)
            .await
            .map_err(|e| StoreError::classify(e, &namespace, &name))
    }

    #[instrument(skip(self, secret), fields(secret = %format!("{}/{}", secret.namespace().unwrap_or_default(), secret.name_any())))]
    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = namespace_of(secret)?;
        let name = secret.name_any();
        debug!("Updating backing secret");
        self.api(&namespace)
            .replace(&name, &Self::post_params(), secret)
            .await
            .map_err(|e| StoreError::classify(e, &namespace, &name))
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        namespace: &str,
        name: &str,
        propagation: PropagationPolicy,
    ) -> Result<(), StoreError> {
        let dp = DeleteParams {
            propagation_policy: Some(propagation),
            ..Default::default()
        };
        debug!("Deleting backing secret");
        self.api(namespace)
            .delete(name, &dp)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::classify(e, namespace, name))
    }
}
