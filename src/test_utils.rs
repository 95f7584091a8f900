// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API server and an in-memory backing store.

use crate::error::StoreError;
use crate::kubernetes::store::{is_token_for, StoreClient};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::core::v1::Secret;
use kube::api::PropagationPolicy;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock secret JSON response
pub fn secret_json(namespace: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1"
        },
        "type": "Opaque"
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" already exists", resource, name),
        "reason": "AlreadyExists",
        "code": 409
    })
    .to_string()
}

/// A write observed by the in-memory store
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Create(Secret),
    Update(Secret),
    Delete {
        namespace: String,
        name: String,
        propagation: String,
    },
}

/// In-memory backing store with read-after-write semantics.
///
/// Cached reads and authoritative writes share one map, so a test can put
/// the store in any state and then inspect both the result and the writes.
#[derive(Clone, Default)]
pub struct FakeStore {
    objects: Arc<Mutex<BTreeMap<(String, String), Secret>>>,
    writes: Arc<Mutex<Vec<Write>>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, secret: Secret) -> Self {
        self.insert(secret);
        self
    }

    pub fn insert(&self, secret: Secret) {
        let key = (secret.namespace().unwrap_or_default(), secret.name_any());
        self.objects.lock().unwrap().insert(key, secret);
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }
}

#[async_trait]
impl StoreClient for FakeStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Secret>, StoreError> {
        Ok(self.object(namespace, name))
    }

    async fn find_service_account_token(
        &self,
        namespace: &str,
        service_account: &str,
    ) -> Result<Option<Secret>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, s)| key.0 == namespace && is_token_for(s, service_account))
            .map(|(_, s)| s.clone())
            .next())
    }

    async fn create(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.writes.lock().unwrap().push(Write::Create(secret.clone()));
        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.clone(), name.clone());
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists { namespace, name });
        }
        objects.insert(key, secret.clone());
        Ok(secret.clone())
    }

    async fn update(&self, secret: &Secret) -> Result<Secret, StoreError> {
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();
        self.writes.lock().unwrap().push(Write::Update(secret.clone()));
        let mut objects = self.objects.lock().unwrap();
        let key = (namespace.clone(), name.clone());
        if !objects.contains_key(&key) {
            return Err(StoreError::NotFound { namespace, name });
        }
        objects.insert(key, secret.clone());
        Ok(secret.clone())
    }

    async fn delete(
        &self,
        namespace: &str,
        name: &str,
        propagation: PropagationPolicy,
    ) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push(Write::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
            propagation: format!("{:?}", propagation),
        });
        match self
            .objects
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()))
        {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }
}
