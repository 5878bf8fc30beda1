//! HTTP client for the tenant, announcement and translation stores.
//!
//! Each store is a JSON collection queried with `?field=value` filters and
//! answering with an array, so lookups by id take the first element.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    build_translation_map, Announcement, Tenant, TenantPatch, TranslationEntry, TranslationMap,
};
use crate::error::TenantApiError;

/// Collection URLs of the three stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantApiConfig {
    #[serde(default = "default_tenants_url")]
    pub tenants_url: String,
    #[serde(default = "default_announcements_url")]
    pub announcements_url: String,
    #[serde(default = "default_translations_url")]
    pub translations_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TenantApiConfig {
    fn default() -> Self {
        Self {
            tenants_url: default_tenants_url(),
            announcements_url: default_announcements_url(),
            translations_url: default_translations_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_tenants_url() -> String {
    "http://localhost:3003/tenants".to_string()
}
fn default_announcements_url() -> String {
    "http://localhost:3002/announcements".to_string()
}
fn default_translations_url() -> String {
    "http://localhost:3001/translations".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Client for the tenant data API.
#[derive(Debug, Clone)]
pub struct TenantApi {
    config: TenantApiConfig,
    http: reqwest::Client,
}

impl TenantApi {
    /// Create a client with a request timeout from `config`.
    pub fn new(config: TenantApiConfig) -> Result<Self, TenantApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(config, http))
    }

    /// Create a client with a pre-configured `reqwest::Client`.
    pub fn with_client(mut config: TenantApiConfig, http: reqwest::Client) -> Self {
        for url in [
            &mut config.tenants_url,
            &mut config.announcements_url,
            &mut config.translations_url,
        ] {
            let trimmed = url.trim_end_matches('/').len();
            url.truncate(trimmed);
        }
        Self { config, http }
    }

    /// The collection URLs in use.
    pub fn config(&self) -> &TenantApiConfig {
        &self.config
    }

    /// Fetch one tenant.
    pub async fn tenant(&self, id: &str) -> Result<Tenant, TenantApiError> {
        let tenants: Vec<Tenant> = self
            .get_json(&self.config.tenants_url, &[("id", id)])
            .await?;
        first_or_not_found(tenants, "tenant", id)
    }

    /// All announcements of a tenant.
    pub async fn announcements(&self, tenant_id: &str) -> Result<Vec<Announcement>, TenantApiError> {
        self.get_json(&self.config.announcements_url, &[("tenantId", tenant_id)])
            .await
    }

    /// One announcement of a tenant.
    pub async fn announcement(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> Result<Announcement, TenantApiError> {
        let list: Vec<Announcement> = self
            .get_json(
                &self.config.announcements_url,
                &[("id", id), ("tenantId", tenant_id)],
            )
            .await?;
        first_or_not_found(list, "announcement", id)
    }

    /// Translations of a tenant for one language, as a key map.
    pub async fn translations(
        &self,
        tenant_id: &str,
        lang: &str,
    ) -> Result<TranslationMap, TenantApiError> {
        let entries: Vec<TranslationEntry> = self
            .get_json(
                &self.config.translations_url,
                &[("tenantId", tenant_id), ("lang", lang)],
            )
            .await?;
        Ok(build_translation_map(entries))
    }

    /// Apply a partial update and return the stored tenant.
    pub async fn patch_tenant(
        &self,
        id: &str,
        patch: &TenantPatch,
    ) -> Result<Tenant, TenantApiError> {
        let url = self.tenant_url(id)?;
        debug!(%url, "PATCH tenant");

        let response = self.http.patch(url.clone()).json(patch).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TenantApiError::NotFound {
                kind: "tenant",
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TenantApiError::Status {
                method: "PATCH",
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// `<tenants_url>/<id>` with `id` percent-encoded as one segment.
    fn tenant_url(&self, id: &str) -> Result<reqwest::Url, TenantApiError> {
        let base = &self.config.tenants_url;
        let invalid = |reason: String| TenantApiError::InvalidUrl {
            url: base.clone(),
            reason,
        };
        let mut url = reqwest::Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot have path segments".into()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TenantApiError> {
        let request = self.http.get(url).query(query).build()?;
        let full_url = request.url().to_string();
        debug!(url = %full_url, "GET");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TenantApiError::Status {
                method: "GET",
                url: full_url,
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

fn first_or_not_found<T>(
    items: Vec<T>,
    kind: &'static str,
    id: &str,
) -> Result<T, TenantApiError> {
    items.into_iter().next().ok_or_else(|| TenantApiError::NotFound {
        kind,
        id: id.to_string(),
    })
}
