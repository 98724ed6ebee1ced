//! Shared test fixtures: in-memory cluster and secret stores plus a fully
//! populated AppPlatform.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use kube::api::DynamicObject;

use platform_operator::crd::{
    AppPlatform, AppPlatformSpec, BackendSpec, ConsoleSpec, GatewaySpec, RoleSpec, SyncSpec,
};
use platform_operator::error::{Error, Result};
use platform_operator::store::{ClusterStore, ResourceKind, SecretStore};

fn object_key(kind: &ResourceKind, name: &str, namespace: &str) -> String {
    format!("{}/{namespace}/{name}", kind.kind)
}

/// In-memory cluster store with optimistic-concurrency semantics: creates
/// fail on existing keys, updates fail on stale resource versions.
#[derive(Default)]
pub struct InMemoryCluster {
    objects: Mutex<HashMap<String, DynamicObject>>,
    unregistered: HashSet<&'static str>,
    next_version: Mutex<u64>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a kind as not registered with this cluster.
    pub fn without_kind(mut self, kind: &ResourceKind) -> Self {
        self.unregistered.insert(kind.kind);
        self
    }

    /// Seed a live object, assigning it a resource version.
    pub fn seed(&self, kind: &ResourceKind, object: DynamicObject) {
        let mut stored = object;
        stored.metadata.resource_version = Some(self.bump_version());
        let key = object_key(
            kind,
            stored.metadata.name.as_deref().unwrap_or("unknown"),
            stored.metadata.namespace.as_deref().unwrap_or("default"),
        );
        self.objects.lock().unwrap().insert(key, stored);
    }

    /// Fetch a stored object for assertions.
    pub fn stored(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Option<DynamicObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&object_key(kind, name, namespace))
            .cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn bump_version(&self) -> String {
        let mut counter = self.next_version.lock().unwrap();
        *counter += 1;
        counter.to_string()
    }
}

#[async_trait]
impl ClusterStore for InMemoryCluster {
    async fn get(
        &self,
        kind: &ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<DynamicObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(&object_key(kind, name, namespace))
            .cloned())
    }

    async fn create(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject> {
        let name = object.metadata.name.as_deref().unwrap_or("unknown");
        let namespace = object.metadata.namespace.as_deref().unwrap_or("default");
        let key = object_key(kind, name, namespace);
        let version = self.bump_version();

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(Error::already_exists(kind.kind, name));
        }
        let mut stored = object.clone();
        stored.metadata.resource_version = Some(version);
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, kind: &ResourceKind, object: &DynamicObject) -> Result<DynamicObject> {
        let name = object.metadata.name.as_deref().unwrap_or("unknown");
        let namespace = object.metadata.namespace.as_deref().unwrap_or("default");
        let key = object_key(kind, name, namespace);
        let version = self.bump_version();

        let mut objects = self.objects.lock().unwrap();
        let Some(live) = objects.get(&key) else {
            return Err(Error::conflict(kind.kind, name));
        };
        if live.metadata.resource_version != object.metadata.resource_version {
            return Err(Error::conflict(kind.kind, name));
        }
        let mut stored = object.clone();
        stored.metadata.resource_version = Some(version);
        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn is_registered(&self, kind: &ResourceKind) -> Result<bool> {
        Ok(!self.unregistered.contains(kind.kind))
    }
}

/// In-memory secret store: an absent secret yields the caller's default, a
/// present secret without the field is an error.
#[derive(Debug, Default)]
pub struct InMemorySecrets {
    secrets: HashMap<String, HashMap<String, String>>,
}

impl InMemorySecrets {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, secret: &str, field: &str, value: &str) -> Self {
        self.secrets
            .entry(secret.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        self
    }
}

#[async_trait]
impl SecretStore for InMemorySecrets {
    async fn field_or(&self, secret: &str, field: &str, default: &str) -> Result<String> {
        match self.secrets.get(secret) {
            None => Ok(default.to_string()),
            Some(fields) => fields
                .get(field)
                .cloned()
                .ok_or_else(|| Error::secret_field(secret, field)),
        }
    }
}

/// A fully populated AppPlatform in the `acme` namespace.
pub fn test_platform() -> AppPlatform {
    let spec = AppPlatformSpec {
        app_label: Some("platform".to_string()),
        tenant_name: Some("acme".to_string()),
        wildcard_domain: Some("example.com".to_string()),
        resource_requirements_enabled: false,
        gateway: Some(GatewaySpec {
            staging: Some(RoleSpec { replicas: Some(1) }),
            production: Some(RoleSpec { replicas: Some(2) }),
            ..Default::default()
        }),
        backend: Some(BackendSpec {
            image: None,
            listener: Some(RoleSpec { replicas: Some(3) }),
            worker: Some(RoleSpec { replicas: Some(2) }),
            cron: Some(RoleSpec { replicas: Some(1) }),
        }),
        console: Some(ConsoleSpec {
            image: None,
            app: Some(RoleSpec { replicas: Some(1) }),
            worker: Some(RoleSpec { replicas: Some(1) }),
        }),
        cache: None,
        sync: Some(SyncSpec {
            image: None,
            database_image: None,
            app: Some(RoleSpec { replicas: Some(1) }),
        }),
    };
    let mut platform = AppPlatform::new("acme-platform", spec);
    platform.metadata.namespace = Some("acme".to_string());
    platform.metadata.uid = Some("uid-acme-platform".to_string());
    platform
}
