// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use crate::conversion::namespace::is_plain_cluster_id;
use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

/// Syncer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier of the tenant cluster whose secrets are mirrored
    pub cluster_id: String,
    /// Backing-cluster secret (namespace, name) holding the tenant kubeconfig
    pub tenant_kubeconfig_secret: Option<(String, String)>,
    pub testing_mode: bool,
    pub cache_sync_timeout: Duration,
    pub requeue_base_delay: Duration,
    pub requeue_max_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cluster_id = lookup("CLUSTER_ID").context("CLUSTER_ID environment variable not set")?;
        // Dashes would make backing namespaces of different clusters ambiguous
        if !is_plain_cluster_id(&cluster_id) {
            bail!(
                "CLUSTER_ID must be non-empty lowercase letters and digits, got '{}'",
                cluster_id
            );
        }

        // For testing, infer the tenant client from the local kubeconfig instead of a secret
        let testing_mode: bool = lookup("TESTING_MODE")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .unwrap_or(false);

        let tenant_kubeconfig_secret = match lookup("TENANT_KUBECONFIG_SECRET") {
            Some(value) => Some(parse_secret_ref(&value)?),
            None if testing_mode => None,
            None => bail!("TENANT_KUBECONFIG_SECRET environment variable not set"),
        };

        let requeue_base_delay = secs(&lookup, "REQUEUE_BASE_DELAY_SECS", defaults::REQUEUE_BASE_DELAY_SECS)?;
        let requeue_max_delay = secs(&lookup, "REQUEUE_MAX_DELAY_SECS", defaults::REQUEUE_MAX_DELAY_SECS)?;
        if requeue_max_delay < requeue_base_delay {
            bail!("REQUEUE_MAX_DELAY_SECS must not be lower than REQUEUE_BASE_DELAY_SECS");
        }

        Ok(Config {
            cluster_id,
            tenant_kubeconfig_secret,
            testing_mode,
            cache_sync_timeout: secs(&lookup, "CACHE_SYNC_TIMEOUT_SECS", defaults::CACHE_SYNC_TIMEOUT_SECS)?,
            requeue_base_delay,
            requeue_max_delay,
        })
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    let value = match lookup(key) {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, v))?,
        None => default,
    };
    Ok(Duration::from_secs(value))
}

fn parse_secret_ref(value: &str) -> Result<(String, String)> {
    match value.split_once('/') {
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() => Ok((ns.to_string(), name.to_string())),
        _ => bail!("TENANT_KUBECONFIG_SECRET must be of the form namespace/name, got '{}'", value),
    }
}
