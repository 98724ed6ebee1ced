//! Cache desired state: one deployment and its service.

use super::{component_labels, deployment, service, DesiredResource};
use crate::error::Result;
use crate::resolver::{CacheConfig, ImagesConfig};

const CACHE_PORT: i32 = 11211;

/// Build the cache child resources. The cache is a fixed single instance.
pub fn cache_resources(
    config: &CacheConfig,
    images: &ImagesConfig,
    namespace: &str,
) -> Result<Vec<DesiredResource>> {
    let labels = component_labels(&config.identity.app_label, "cache");

    Ok(vec![
        deployment(
            namespace,
            "cache",
            labels.clone(),
            1,
            &images.cache,
            CACHE_PORT,
            Vec::new(),
            &config.resources,
        )?,
        service(namespace, "cache", labels, "cache", CACHE_PORT)?,
    ])
}
