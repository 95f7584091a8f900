// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::MAX_NAMESPACE_LEN;
use sha2::{Digest, Sha256};

/// Length of the hex digest suffix appended to hashed namespace names
const DIGEST_LEN: usize = 5;

/// Map a tenant namespace to its namespace in the backing cluster.
///
/// The cluster identifier prefixes the result so identically named namespaces
/// of different tenants never meet. The plain `{cluster}-{namespace}` form is
/// only used for lowercase alphanumeric cluster ids, where the first dash
/// separates the two parts. Any other id, and any joined name over the
/// namespace limit, gets a digest of the (cluster, namespace) pair appended,
/// truncating the readable part to fit.
pub fn to_backing_namespace(cluster: &str, namespace: &str) -> String {
    let joined = format!("{}-{}", cluster, namespace);
    if is_plain_cluster_id(cluster) && joined.len() <= MAX_NAMESPACE_LEN {
        return joined;
    }

    // Length prefix keeps the digest input unambiguous for any cluster id
    let pair = format!("{}:{}/{}", cluster.len(), cluster, namespace);
    let digest = hex::encode(Sha256::digest(pair.as_bytes()));

    let mut keep = joined.len().min(MAX_NAMESPACE_LEN - DIGEST_LEN - 1);
    while !joined.is_char_boundary(keep) {
        keep -= 1;
    }
    format!("{}-{}", &joined[..keep], &digest[..DIGEST_LEN])
}

/// Cluster ids made of lowercase ASCII letters and digits only
pub fn is_plain_cluster_id(cluster: &str) -> bool {
    !cluster.is_empty()
        && cluster
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_cluster_and_namespace() {
        assert_eq!(to_backing_namespace("c1", "acme"), "c1-acme");
    }

    #[test]
    fn test_is_stable() {
        assert_eq!(
            to_backing_namespace("tenanta", "kube-system"),
            to_backing_namespace("tenanta", "kube-system")
        );
    }

    #[test]
    fn test_dashed_cluster_ids_do_not_collide() {
        let dashed = to_backing_namespace("a-b", "c");
        let plain = to_backing_namespace("a", "b-c");

        assert_eq!(plain, "a-b-c");
        assert_ne!(dashed, plain);
        assert!(dashed.starts_with("a-b-c-"));
        assert_eq!(dashed.len(), "a-b-c".len() + 1 + DIGEST_LEN);
    }

    #[test]
    fn test_multibyte_cluster_id_is_truncated_on_char_boundary() {
        let cluster = "é".repeat(30);

        let mapped = to_backing_namespace(&cluster, "payments");

        assert!(mapped.len() <= MAX_NAMESPACE_LEN);
        assert!(mapped.starts_with("éé"));
        assert_eq!(mapped, to_backing_namespace(&cluster, "payments"));
    }

    #[test]
    fn test_plain_cluster_ids() {
        assert!(is_plain_cluster_id("c1"));
        assert!(is_plain_cluster_id("tenant42"));
        assert!(!is_plain_cluster_id(""));
        assert!(!is_plain_cluster_id("a-b"));
        assert!(!is_plain_cluster_id("Prod"));
        assert!(!is_plain_cluster_id("é"));
    }

    #[test]
    fn test_same_namespace_in_different_clusters() {
        assert_ne!(to_backing_namespace("c1", "default"), to_backing_namespace("c2", "default"));
    }

    #[test]
    fn test_long_names_are_truncated_with_digest() {
        let cluster = "a".repeat(40);
        let namespace = "b".repeat(40);

        let mapped = to_backing_namespace(&cluster, &namespace);

        assert_eq!(mapped.len(), MAX_NAMESPACE_LEN);
        assert!(mapped.starts_with(&cluster));
        assert_eq!(&mapped[57..58], "-");
        assert_eq!(mapped, to_backing_namespace(&cluster, &namespace));
    }

    #[test]
    fn test_long_names_sharing_prefix_stay_distinct() {
        let cluster = "a".repeat(40);
        let one = to_backing_namespace(&cluster, &format!("{}-one", "b".repeat(30)));
        let two = to_backing_namespace(&cluster, &format!("{}-two", "b".repeat(30)));

        assert_eq!(one[..57], two[..57]);
        assert_ne!(one, two);
    }

    #[test]
    fn test_exact_limit_is_not_hashed() {
        let namespace = "n".repeat(MAX_NAMESPACE_LEN - 3);
        let mapped = to_backing_namespace("c1", &namespace);
        assert_eq!(mapped, format!("c1-{}", namespace));
    }
}
