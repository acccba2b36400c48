//! Resource attributes identifying the emitting process.
//!
//! A [`Resource`] is an immutable set of key/value attributes (service name,
//! namespace, cloud region, ...) attached to every record and span exported
//! by a process. It is built once at bootstrap and shared by reference across
//! all exporters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known resource attribute keys.
///
/// The subset of the OpenTelemetry semantic conventions this pipeline sets.
pub mod semconv {
    /// Logical name of the service.
    pub const SERVICE_NAME: &str = "service.name";
    /// Namespace grouping related services.
    pub const SERVICE_NAMESPACE: &str = "service.namespace";
    /// Cloud provider name (e.g. `aws`).
    pub const CLOUD_PROVIDER: &str = "cloud.provider";
    /// Cloud region the process runs in.
    pub const CLOUD_REGION: &str = "cloud.region";
    /// Cloud platform variant (e.g. `aws_ecs`).
    pub const CLOUD_PLATFORM: &str = "cloud.platform";
    /// Deployment environment (e.g. `staging`, `production`).
    pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";
}

/// Immutable identity attributes of the emitting process.
///
/// # Example
///
/// ```
/// use telemetry::resource::{semconv, Resource};
///
/// let resource = Resource::new("demo-app-rust")
///     .with_attribute(semconv::SERVICE_NAMESPACE, "demo-app")
///     .with_attribute(semconv::DEPLOYMENT_ENVIRONMENT, "staging");
///
/// assert_eq!(resource.get(semconv::SERVICE_NAME), Some("demo-app-rust"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    attributes: BTreeMap<String, String>,
}

impl Resource {
    /// Creates a resource with the given service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(semconv::SERVICE_NAME.to_string(), service_name.into());
        Self { attributes }
    }

    /// Creates a resource with the standard identity attribute set.
    ///
    /// Convenience constructor covering the attributes every deployment of
    /// this pipeline sets: namespace, service name, cloud provider and
    /// region, and deployment environment.
    #[must_use]
    pub fn basic(
        service_namespace: &str,
        service_name: &str,
        cloud_provider: &str,
        cloud_region: &str,
        deployment_environment: &str,
    ) -> Self {
        Self::new(service_name)
            .with_attribute(semconv::SERVICE_NAMESPACE, service_namespace)
            .with_attribute(semconv::CLOUD_PROVIDER, cloud_provider)
            .with_attribute(semconv::CLOUD_REGION, cloud_region)
            .with_attribute(semconv::DEPLOYMENT_ENVIRONMENT, deployment_environment)
    }

    /// Adds an attribute, consuming and returning the resource.
    ///
    /// Construction is the only time attributes can be set; once the
    /// resource is handed to the pipeline it is never mutated.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the value of an attribute, if set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Iterates over all attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_service_name() {
        let resource = Resource::new("svc");
        assert_eq!(resource.get(semconv::SERVICE_NAME), Some("svc"));
    }

    #[test]
    fn test_basic_sets_standard_attributes() {
        let resource = Resource::basic("demo-app", "demo-app-rust", "aws", "eu-west-1", "staging");

        assert_eq!(resource.get(semconv::SERVICE_NAMESPACE), Some("demo-app"));
        assert_eq!(resource.get(semconv::SERVICE_NAME), Some("demo-app-rust"));
        assert_eq!(resource.get(semconv::CLOUD_PROVIDER), Some("aws"));
        assert_eq!(resource.get(semconv::CLOUD_REGION), Some("eu-west-1"));
        assert_eq!(
            resource.get(semconv::DEPLOYMENT_ENVIRONMENT),
            Some("staging")
        );
    }

    #[test]
    fn test_with_attribute_overrides() {
        let resource = Resource::new("svc").with_attribute(semconv::SERVICE_NAME, "other");
        assert_eq!(resource.get(semconv::SERVICE_NAME), Some("other"));
    }

    #[test]
    fn test_attributes_iteration_is_sorted() {
        let resource = Resource::new("svc")
            .with_attribute("b.key", "2")
            .with_attribute("a.key", "1");

        let keys: Vec<&str> = resource.attributes().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
