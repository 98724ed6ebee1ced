//! API gateway resolution.
//!
//! The gateway has no secret-backed fields; everything comes from the root
//! spec or the catalog.

use k8s_openapi::api::core::v1::ResourceRequirements;

use crate::catalog::Catalog;
use crate::crd::AppPlatformSpec;
use crate::error::Result;
use crate::resolver::{required_replicas, role_requirements, Identity};

/// Default gateway management API mode
const DEFAULT_MANAGEMENT_API: &str = "status";

/// Fully-resolved gateway configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayConfig {
    /// Shared identity fields
    pub identity: Identity,
    /// Management API mode
    pub management_api: String,
    /// Verify upstream TLS certificates
    pub openssl_verify: bool,
    /// Include response codes in analytics
    pub response_codes: bool,
    /// Staging replicas
    pub staging_replicas: i32,
    /// Production replicas
    pub production_replicas: i32,
    /// Staging resource requirements
    pub staging_resources: ResourceRequirements,
    /// Production resource requirements
    pub production_resources: ResourceRequirements,
}

impl GatewayConfig {
    fn validate(&self) -> Result<()> {
        self.identity.validate("gateway")?;
        super::require("gateway", "managementApi", &self.management_api)?;
        Ok(())
    }
}

/// Resolve the gateway subcomponent.
pub fn resolve_gateway(spec: &AppPlatformSpec, catalog: &Catalog) -> Result<GatewayConfig> {
    let gateway = spec.gateway.as_ref();
    let enabled = spec.resource_requirements_enabled;

    let config = GatewayConfig {
        identity: Identity::from_spec(spec),
        management_api: gateway
            .and_then(|g| g.management_api.clone())
            .unwrap_or_else(|| DEFAULT_MANAGEMENT_API.to_string()),
        openssl_verify: gateway.and_then(|g| g.openssl_verify).unwrap_or(false),
        response_codes: gateway.and_then(|g| g.response_codes).unwrap_or(true),
        staging_replicas: required_replicas(
            "gateway",
            "staging.replicas",
            gateway.and_then(|g| g.staging.as_ref()),
        )?,
        production_replicas: required_replicas(
            "gateway",
            "production.replicas",
            gateway.and_then(|g| g.production.as_ref()),
        )?,
        staging_resources: role_requirements(enabled, &catalog.profiles.gateway_staging),
        production_resources: role_requirements(enabled, &catalog.profiles.gateway_production),
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{GatewaySpec, RoleSpec};
    use crate::error::Error;

    fn base_spec() -> AppPlatformSpec {
        AppPlatformSpec {
            app_label: Some("platform".to_string()),
            tenant_name: Some("acme".to_string()),
            wildcard_domain: Some("example.com".to_string()),
            resource_requirements_enabled: true,
            gateway: Some(GatewaySpec {
                staging: Some(RoleSpec { replicas: Some(1) }),
                production: Some(RoleSpec { replicas: Some(2) }),
                ..Default::default()
            }),
            backend: None,
            console: None,
            cache: None,
            sync: None,
        }
    }

    #[test]
    fn test_defaults_applied_for_unset_tuning_flags() {
        let config = resolve_gateway(&base_spec(), &Catalog::default()).expect("resolves");
        assert_eq!(config.management_api, "status");
        assert!(!config.openssl_verify);
        assert!(config.response_codes);
        assert_eq!(config.staging_replicas, 1);
        assert_eq!(config.production_replicas, 2);
    }

    #[test]
    fn test_explicit_tuning_flags_override_defaults() {
        let mut spec = base_spec();
        let gateway = spec.gateway.as_mut().unwrap();
        gateway.management_api = Some("debug".to_string());
        gateway.openssl_verify = Some(true);
        gateway.response_codes = Some(false);

        let config = resolve_gateway(&spec, &Catalog::default()).expect("resolves");
        assert_eq!(config.management_api, "debug");
        assert!(config.openssl_verify);
        assert!(!config.response_codes);
    }

    #[test]
    fn test_missing_production_replicas_is_a_validation_error() {
        let mut spec = base_spec();
        spec.gateway.as_mut().unwrap().production = None;
        let err = resolve_gateway(&spec, &Catalog::default()).expect_err("missing replicas");
        match err {
            Error::Validation { component, field } => {
                assert_eq!(component, "gateway");
                assert_eq!(field, "production.replicas");
            }
            other => panic!("expected Validation error, got {other}"),
        }
    }

    #[test]
    fn test_footprint_enabled_uses_catalog_profiles() {
        let catalog = Catalog::default();
        let config = resolve_gateway(&base_spec(), &catalog).expect("resolves");
        assert_eq!(config.staging_resources, catalog.profiles.gateway_staging);
        assert_eq!(
            config.production_resources,
            catalog.profiles.gateway_production
        );
    }
}
