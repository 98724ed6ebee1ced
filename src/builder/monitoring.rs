//! Monitoring desired state shared by the gateway and backend tiers: a
//! Grafana dashboard, Prometheus alerting rules, and a scrape endpoint.
//!
//! These kinds are optional companions; whether they can actually be applied
//! is decided at reconcile time.

use serde_json::json;

use super::{to_dynamic, DesiredResource};
use crate::error::Result;
use crate::store::ResourceKind;

const MONITORING_KEY: &str = "middleware";

/// Build the monitoring set for one component.
pub fn monitoring_resources(
    component: &str,
    app_label: &str,
    namespace: &str,
) -> Result<Vec<DesiredResource>> {
    Ok(vec![
        grafana_dashboard(component, namespace)?,
        prometheus_rules(component, namespace)?,
        service_monitor(component, app_label, namespace)?,
    ])
}

fn grafana_dashboard(component: &str, namespace: &str) -> Result<DesiredResource> {
    let dashboard = json!({
        "title": format!("{component} overview"),
        "panels": [
            {
                "title": "Running pods",
                "type": "graph",
                "targets": [{
                    "expr": format!(
                        "sum(kube_pod_status_ready{{namespace=\"{namespace}\",pod=~\"{component}.*\"}})"
                    )
                }]
            },
            {
                "title": "Memory usage",
                "type": "graph",
                "targets": [{
                    "expr": format!(
                        "sum(container_memory_usage_bytes{{namespace=\"{namespace}\",pod=~\"{component}.*\"}})"
                    )
                }]
            }
        ]
    });
    to_dynamic(
        &ResourceKind::GRAFANA_DASHBOARD,
        json!({
            "metadata": {
                "name": component,
                "namespace": namespace,
                "labels": { "monitoring-key": MONITORING_KEY }
            },
            "spec": {
                "name": format!("{component}.json"),
                "json": dashboard.to_string()
            }
        }),
    )
}

fn prometheus_rules(component: &str, namespace: &str) -> Result<DesiredResource> {
    to_dynamic(
        &ResourceKind::PROMETHEUS_RULE,
        json!({
            "metadata": {
                "name": component,
                "namespace": namespace,
                "labels": {
                    "monitoring-key": MONITORING_KEY,
                    "prometheus": "application-monitoring",
                    "role": "alert-rules"
                }
            },
            "spec": {
                "groups": [{
                    "name": component,
                    "rules": [{
                        "alert": format!("{component}WorkloadDown"),
                        "expr": format!(
                            "sum(kube_pod_status_ready{{namespace=\"{namespace}\",pod=~\"{component}.*\"}}) < 1"
                        ),
                        "for": "2m",
                        "labels": { "severity": "critical" },
                        "annotations": {
                            "summary": format!("{component} on {namespace}: no running pods"),
                            "description": format!(
                                "{component} on the {namespace} namespace has no ready pods"
                            )
                        }
                    }]
                }]
            }
        }),
    )
}

fn service_monitor(component: &str, app_label: &str, namespace: &str) -> Result<DesiredResource> {
    to_dynamic(
        &ResourceKind::SERVICE_MONITOR,
        json!({
            "metadata": {
                "name": component,
                "namespace": namespace,
                "labels": { "monitoring-key": MONITORING_KEY }
            },
            "spec": {
                "endpoints": [{ "port": "metrics" }],
                "selector": {
                    "matchLabels": {
                        "app": app_label,
                        "app.kubernetes.io/component": component
                    }
                }
            }
        }),
    )
}
