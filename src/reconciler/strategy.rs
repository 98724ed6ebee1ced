//! Per-kind comparison strategies.
//!
//! Each kind gets a pair of pure functions: `needs_update` decides whether
//! any tracked field diverges between the desired and live bodies, and
//! `apply_tracked` copies exactly those fields onto the live body. Nothing
//! else on the live object is inspected or touched, so fields populated by
//! other actors (resolved image digests, injected sidecars, defaulted spec
//! values) never cause spurious updates and are never overwritten.
//!
//! Kinds without an entry are create-only: once the object exists, only
//! metadata is reconciled.

use kube::api::DynamicObject;
use serde_json::Value;

use crate::store::ResourceKind;

/// Comparison strategy for one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// Whether any tracked field differs between desired and existing
    pub needs_update: fn(&DynamicObject, &DynamicObject) -> bool,
    /// Copy the tracked fields of `desired` onto `existing`
    pub apply_tracked: fn(&DynamicObject, &mut DynamicObject),
}

/// Look up the strategy for a kind.
pub fn strategy_for(kind: &ResourceKind) -> Strategy {
    match kind.kind {
        "Deployment" => Strategy {
            needs_update: deployment_needs_update,
            apply_tracked: deployment_apply_tracked,
        },
        "ConfigMap" => Strategy {
            needs_update: config_map_needs_update,
            apply_tracked: config_map_apply_tracked,
        },
        _ => Strategy {
            needs_update: create_only_needs_update,
            apply_tracked: create_only_apply_tracked,
        },
    }
}

fn create_only_needs_update(_desired: &DynamicObject, _existing: &DynamicObject) -> bool {
    false
}

fn create_only_apply_tracked(_desired: &DynamicObject, _existing: &mut DynamicObject) {}

// Deployments track the replica count and per-container resource
// requirements. Containers are matched by name; a desired container missing
// from the live object counts as divergence.

fn containers(object: &DynamicObject) -> Vec<Value> {
    object
        .data
        .pointer("/spec/template/spec/containers")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Normalize an absent or null resources block to an empty object so that
/// "unconstrained" compares equal regardless of serialization.
fn container_resources(container: &Value) -> Value {
    match container.get("resources") {
        Some(Value::Null) | None => Value::Object(serde_json::Map::new()),
        Some(other) => other.clone(),
    }
}

fn deployment_needs_update(desired: &DynamicObject, existing: &DynamicObject) -> bool {
    let desired_replicas = desired.data.pointer("/spec/replicas");
    let existing_replicas = existing.data.pointer("/spec/replicas");
    if desired_replicas != existing_replicas {
        return true;
    }

    let existing_containers = containers(existing);
    for desired_container in containers(desired) {
        let name = &desired_container["name"];
        match existing_containers.iter().find(|c| &c["name"] == name) {
            Some(live) => {
                if container_resources(live) != container_resources(&desired_container) {
                    return true;
                }
            }
            None => return true,
        }
    }
    false
}

fn deployment_apply_tracked(desired: &DynamicObject, existing: &mut DynamicObject) {
    if let Some(replicas) = desired.data.pointer("/spec/replicas").cloned() {
        if let Some(spec) = existing.data.pointer_mut("/spec") {
            spec["replicas"] = replicas;
        }
    }

    let desired_containers = containers(desired);
    if let Some(live_containers) = existing
        .data
        .pointer_mut("/spec/template/spec/containers")
        .and_then(Value::as_array_mut)
    {
        for live in live_containers.iter_mut() {
            let name = live["name"].clone();
            if let Some(matched) = desired_containers.iter().find(|c| c["name"] == name) {
                live["resources"] = container_resources(matched);
            }
        }
    }
}

// ConfigMaps track exactly the data keys present in the desired body; keys
// added by other actors are left alone.

fn data_entries(object: &DynamicObject) -> serde_json::Map<String, Value> {
    object
        .data
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn config_map_needs_update(desired: &DynamicObject, existing: &DynamicObject) -> bool {
    let live = data_entries(existing);
    data_entries(desired)
        .iter()
        .any(|(key, value)| live.get(key) != Some(value))
}

fn config_map_apply_tracked(desired: &DynamicObject, existing: &mut DynamicObject) {
    let entries = data_entries(desired);
    if entries.is_empty() {
        return;
    }
    if !existing.data.get("data").is_some_and(Value::is_object) {
        existing.data["data"] = Value::Object(serde_json::Map::new());
    }
    if let Some(live) = existing.data["data"].as_object_mut() {
        for (key, value) in entries {
            live.insert(key, value);
        }
    }
}
