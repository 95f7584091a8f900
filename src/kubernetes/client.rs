// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant cluster client creation and kubeconfig utilities

use crate::config::Config;
use crate::constants::KUBECONFIG_KEY;
use crate::error::{Result, SyncerError};
use k8s_openapi::api::core::v1::Secret;
use kube::{config::KubeConfigOptions, Api, Client};
use tracing::{info, instrument};

/// Create a Kubernetes client for the tenant cluster
#[instrument(skip(backing_client, config), fields(cluster = %config.cluster_id))]
pub async fn create_tenant_client(backing_client: &Client, config: &Config) -> Result<Client> {
    match &config.tenant_kubeconfig_secret {
        Some((namespace, name)) => {
            let kubeconfig = get_tenant_kubeconfig(backing_client, namespace, name).await?;
            create_client_from_kubeconfig(&kubeconfig).await
        }
        None if config.testing_mode => {
            info!("Testing mode: using the local kubeconfig for the tenant cluster");
            Client::try_default()
                .await
                .map_err(|e| SyncerError::KubeconfigError(format!("Failed to infer config: {}", e)))
        }
        None => Err(SyncerError::KubeconfigError(
            "no tenant kubeconfig secret configured".to_string(),
        )),
    }
}

/// Read the tenant admin kubeconfig from its secret in the backing cluster
#[instrument(skip(client))]
async fn get_tenant_kubeconfig(client: &Client, namespace: &str, name: &str) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);

    info!("Getting tenant kubeconfig secret '{}/{}'...", namespace, name);

    let secret = secrets.get(name).await.map_err(|e| {
        SyncerError::KubeconfigError(format!(
            "Failed to get kubeconfig secret {}/{}: {}",
            namespace, name, e
        ))
    })?;

    let Some(data) = secret.data.as_ref() else {
        return Err(SyncerError::KubeconfigError(format!(
            "Kubeconfig secret {}/{} has no data",
            namespace, name
        )));
    };

    let Some(kubeconfig_data) = data.get(KUBECONFIG_KEY) else {
        return Err(SyncerError::KubeconfigError(format!(
            "Kubeconfig secret {}/{} does not contain '{}' key",
            namespace, name, KUBECONFIG_KEY
        )));
    };

    String::from_utf8(kubeconfig_data.0.clone()).map_err(|e| {
        SyncerError::KubeconfigError(format!(
            "Failed to decode kubeconfig in {}/{}: {}",
            namespace, name, e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    use kube::config::Kubeconfig;

    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| SyncerError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                SyncerError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| SyncerError::KubeconfigError(format!("Failed to create client: {}", e)))
}
