//! Public host resolution for composed short URLs.

use serde_json::json;

use crate::config::TenantConfig;
use crate::error::AppError;

/// Derives the public host a short URL is served from.
///
/// In single-instance mode every short URL uses `host_name`. In multi-instance mode the
/// state-level tenant is derived from the `tenantid` header (`pb.amritsar` → `pb`) and
/// looked up in the tenant host map.
#[derive(Debug, Clone)]
pub struct HostResolver {
    tenant: TenantConfig,
    context_path: String,
}

impl HostResolver {
    pub fn new(tenant: TenantConfig, context_path: impl Into<String>) -> Self {
        Self {
            tenant,
            context_path: context_path.into(),
        }
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn is_multi_instance(&self) -> bool {
        self.tenant.is_multi_instance
    }

    /// Extracts the state-level tenant from a (possibly city-level) tenant id.
    ///
    /// The first dot-separated segment is used when its length matches the configured
    /// state-level length. Otherwise the configured default tenant is used, or, in strict
    /// mode, the request is rejected. An absent or blank header always yields the default.
    pub fn state_level_tenant(&self, tenant_id: Option<&str>) -> Result<String, AppError> {
        let Some(tenant_id) = tenant_id.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(self.tenant.state_level_tenant_id.clone());
        };

        let prefix = tenant_id.split('.').next().unwrap_or_default();
        if prefix.chars().count() == self.tenant.state_level_tenant_id_length {
            return Ok(prefix.to_string());
        }

        if self.tenant.strict {
            return Err(AppError::tenant_not_configured(
                "Cannot derive state-level tenant",
                json!({
                    "tenant_id": tenant_id,
                    "expected_prefix_length": self.tenant.state_level_tenant_id_length,
                }),
            ));
        }

        tracing::debug!(
            tenant = tenant_id,
            fallback = %self.tenant.state_level_tenant_id,
            "Falling back to default state-level tenant"
        );
        Ok(self.tenant.state_level_tenant_id.clone())
    }

    /// Resolves the public host for a request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TenantNotConfigured`] in multi-instance mode when the derived
    /// tenant has no host mapping (or cannot be derived in strict mode).
    pub fn resolve_host(&self, tenant_id: Option<&str>) -> Result<String, AppError> {
        if !self.tenant.is_multi_instance {
            return Ok(self.tenant.host_name.clone());
        }

        let tenant = self.state_level_tenant(tenant_id)?;
        self.tenant
            .ui_app_host_map
            .get(&tenant)
            .cloned()
            .ok_or_else(|| {
                AppError::tenant_not_configured(
                    "Host name for the state-level tenant has not been configured",
                    json!({ "tenant": tenant }),
                )
            })
    }

    /// Joins `host`, the context path and `token` with exactly one `/` between segments.
    pub fn compose_short_url(&self, host: &str, token: &str) -> String {
        let host = host.trim().trim_end_matches('/');
        let context = self.context_path.trim_matches('/');

        if context.is_empty() {
            format!("{host}/{token}")
        } else {
            format!("{host}/{context}/{token}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tenant_config(multi: bool, strict: bool) -> TenantConfig {
        let mut ui_app_host_map = HashMap::new();
        ui_app_host_map.insert("pb".to_string(), "https://pb.example.com/".to_string());
        ui_app_host_map.insert("in".to_string(), "https://central.example.com".to_string());

        TenantConfig {
            host_name: "https://short.example.com/".to_string(),
            is_multi_instance: multi,
            state_level_tenant_id: "pb".to_string(),
            state_level_tenant_id_length: 2,
            ui_app_host_map,
            strict,
        }
    }

    #[test]
    fn test_single_instance_uses_host_name() {
        let resolver = HostResolver::new(tenant_config(false, false), "/url-shortening");

        assert_eq!(
            resolver.resolve_host(Some("in.statea")).unwrap(),
            "https://short.example.com/"
        );
        assert_eq!(
            resolver.resolve_host(None).unwrap(),
            "https://short.example.com/"
        );
    }

    #[test]
    fn test_state_level_tenant_extraction() {
        let resolver = HostResolver::new(tenant_config(true, false), "");

        assert_eq!(resolver.state_level_tenant(Some("pb.amritsar")).unwrap(), "pb");
        assert_eq!(resolver.state_level_tenant(Some("in")).unwrap(), "in");
        assert_eq!(resolver.state_level_tenant(Some("")).unwrap(), "pb");
        assert_eq!(resolver.state_level_tenant(None).unwrap(), "pb");
    }

    #[test]
    fn test_silent_fallback_on_unexpected_prefix_length() {
        let resolver = HostResolver::new(tenant_config(true, false), "");

        assert_eq!(
            resolver.state_level_tenant(Some("punjab.amritsar")).unwrap(),
            "pb"
        );
        assert_eq!(
            resolver.resolve_host(Some("punjab.amritsar")).unwrap(),
            "https://pb.example.com/"
        );
    }

    #[test]
    fn test_strict_mode_rejects_underivable_tenant() {
        let resolver = HostResolver::new(tenant_config(true, true), "");

        let err = resolver
            .state_level_tenant(Some("punjab.amritsar"))
            .unwrap_err();
        assert!(matches!(err, AppError::TenantNotConfigured { .. }));

        assert_eq!(resolver.state_level_tenant(None).unwrap(), "pb");
    }

    #[test]
    fn test_multi_instance_host_lookup() {
        let resolver = HostResolver::new(tenant_config(true, false), "");

        assert_eq!(
            resolver.resolve_host(Some("in.statea")).unwrap(),
            "https://central.example.com"
        );
    }

    #[test]
    fn test_multi_instance_unmapped_tenant() {
        let resolver = HostResolver::new(tenant_config(true, false), "");

        let err = resolver.resolve_host(Some("mh.pune")).unwrap_err();
        assert!(matches!(err, AppError::TenantNotConfigured { .. }));
    }

    #[test]
    fn test_compose_short_url_single_separators() {
        let resolver = HostResolver::new(tenant_config(false, false), "/url-shortening/");

        assert_eq!(
            resolver.compose_short_url("https://short.example.com/", "abc"),
            "https://short.example.com/url-shortening/abc"
        );
        assert_eq!(
            resolver.compose_short_url("https://short.example.com", "abc"),
            "https://short.example.com/url-shortening/abc"
        );
    }

    #[test]
    fn test_compose_short_url_without_context_path() {
        let resolver = HostResolver::new(tenant_config(false, false), "");

        assert_eq!(
            resolver.compose_short_url("https://short.example.com/", "xyz"),
            "https://short.example.com/xyz"
        );
    }
}
