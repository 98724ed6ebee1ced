//! Metadata reconciliation, applied to every kind regardless of its
//! comparison strategy.
//!
//! Labels and annotations merge additively: desired keys are set, keys owned
//! by other actors are preserved, and nothing is ever deleted. The managing
//! owner reference is added when missing; owner references belonging to
//! other controllers are never removed.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::DynamicObject;

use crate::crd::AppPlatform;
use crate::error::{Error, Result};

/// Stable identity of the managing `AppPlatform`, used to stamp and verify
/// owner references on child resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerIdentity {
    /// Owner apiVersion
    pub api_version: String,
    /// Owner kind
    pub kind: String,
    /// Owner name
    pub name: String,
    /// Owner UID
    pub uid: String,
}

impl OwnerIdentity {
    /// Extract the identity from a live `AppPlatform`. The name and UID must
    /// both be present; without them child resources cannot be owned.
    pub fn from_platform(platform: &AppPlatform) -> Result<Self> {
        let name = platform
            .metadata
            .name
            .clone()
            .ok_or_else(|| Error::validation("platform", "metadata.name"))?;
        let uid = platform
            .metadata
            .uid
            .clone()
            .ok_or_else(|| Error::validation("platform", "metadata.uid"))?;
        Ok(Self {
            api_version: "apps.platformkit.io/v1alpha1".to_string(),
            kind: "AppPlatform".to_string(),
            name,
            uid,
        })
    }

    /// Render as an owner reference marking this operator as the controller.
    pub fn owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            uid: self.uid.clone(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }

    fn matches(&self, reference: &OwnerReference) -> bool {
        reference.kind == self.kind && reference.name == self.name && reference.uid == self.uid
    }
}

/// Merge desired metadata into the live object and ensure the owner
/// reference. Returns whether anything changed.
pub(crate) fn ensure_metadata(
    existing: &mut DynamicObject,
    desired: &DynamicObject,
    owner: &OwnerIdentity,
) -> bool {
    let mut changed = merge_map(&mut existing.metadata.labels, &desired.metadata.labels);
    changed |= merge_map(
        &mut existing.metadata.annotations,
        &desired.metadata.annotations,
    );
    changed |= ensure_owner_reference(existing, owner);
    changed
}

/// Stamp the owner reference on a body about to be created.
pub(crate) fn stamp_owner(object: &mut DynamicObject, owner: &OwnerIdentity) {
    ensure_owner_reference(object, owner);
}

fn ensure_owner_reference(object: &mut DynamicObject, owner: &OwnerIdentity) -> bool {
    let references = object.metadata.owner_references.get_or_insert_with(Vec::new);
    if references.iter().any(|r| owner.matches(r)) {
        return false;
    }
    references.push(owner.owner_reference());
    true
}

fn merge_map(
    target: &mut Option<BTreeMap<String, String>>,
    desired: &Option<BTreeMap<String, String>>,
) -> bool {
    let Some(desired) = desired else {
        return false;
    };
    if desired.is_empty() {
        return false;
    }
    let target = target.get_or_insert_with(BTreeMap::new);
    let mut changed = false;
    for (key, value) in desired {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn owner() -> OwnerIdentity {
        OwnerIdentity {
            api_version: "apps.platformkit.io/v1alpha1".to_string(),
            kind: "AppPlatform".to_string(),
            name: "acme-platform".to_string(),
            uid: "uid-1234".to_string(),
        }
    }

    fn foreign_reference() -> OwnerReference {
        OwnerReference {
            api_version: "something.else.io/v1".to_string(),
            kind: "OtherOwner".to_string(),
            name: "other".to_string(),
            uid: "uid-foreign".to_string(),
            controller: None,
            block_owner_deletion: None,
        }
    }

    fn object_with(labels: &[(&str, &str)], references: Vec<OwnerReference>) -> DynamicObject {
        DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some("backend-listener".to_string()),
                namespace: Some("acme".to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                owner_references: Some(references),
                ..Default::default()
            },
            data: serde_json::json!({}),
        }
    }

    #[test]
    fn test_merge_preserves_foreign_labels() {
        let desired = object_with(&[("app", "platform")], Vec::new());
        let mut existing = object_with(&[("injected", "elsewhere")], Vec::new());

        let changed = ensure_metadata(&mut existing, &desired, &owner());
        assert!(changed);

        let labels = existing.metadata.labels.unwrap();
        assert_eq!(labels.get("app").map(String::as_str), Some("platform"));
        assert_eq!(
            labels.get("injected").map(String::as_str),
            Some("elsewhere")
        );
    }

    #[test]
    fn test_foreign_owner_reference_is_kept() {
        let desired = object_with(&[], Vec::new());
        let mut existing = object_with(&[], vec![foreign_reference()]);

        ensure_metadata(&mut existing, &desired, &owner());

        let references = existing.metadata.owner_references.unwrap();
        assert_eq!(references.len(), 2);
        assert!(references.iter().any(|r| r.kind == "OtherOwner"));
        assert!(references.iter().any(|r| r.kind == "AppPlatform"));
    }

    #[test]
    fn test_metadata_reconciliation_is_idempotent() {
        let desired = object_with(&[("app", "platform")], Vec::new());
        let mut existing = object_with(&[("app", "platform")], vec![owner().owner_reference()]);

        let changed = ensure_metadata(&mut existing, &desired, &owner());
        assert!(!changed);
        assert_eq!(existing.metadata.owner_references.unwrap().len(), 1);
    }

    #[test]
    fn test_stamp_owner_sets_controller_reference() {
        let mut object = object_with(&[], Vec::new());
        stamp_owner(&mut object, &owner());
        let references = object.metadata.owner_references.unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].controller, Some(true));
        assert_eq!(references[0].uid, "uid-1234");
    }
}
