//! Tenant, announcement and translation records as served by the data API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Brand colors applied by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantTheme {
    pub primary: String,
    pub secondary: String,
}

/// Page title and description for search engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSeo {
    pub title: String,
    pub description: String,
}

/// An organization with its own storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub default_lang: String,
    pub supported_langs: Vec<String>,
    pub theme: TenantTheme,
    pub logo_url: String,
    pub country: String,
    /// Absent in older records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<TenantSeo>,
}

/// Description used when a tenant has no SEO block.
pub const DEFAULT_SEO_DESCRIPTION: &str =
    "Página padrão de listagem de veículos e campanhas para este tenant.";

impl Tenant {
    /// The configured SEO block, or the admin form's defaults.
    pub fn seo_or_default(&self) -> TenantSeo {
        self.seo.clone().unwrap_or_else(|| TenantSeo {
            title: format!("{} — Seminovos e ofertas", self.name),
            description: DEFAULT_SEO_DESCRIPTION.to_string(),
        })
    }

    /// Whether `lang` is one of the tenant's languages.
    pub fn supports_lang(&self, lang: &str) -> bool {
        self.supported_langs.iter().any(|l| l == lang)
    }

    /// `lang` if supported, else the tenant's default language.
    pub fn lang_or_default<'a>(&'a self, lang: Option<&'a str>) -> &'a str {
        match lang {
            Some(lang) if self.supports_lang(lang) => lang,
            _ => &self.default_lang,
        }
    }
}

/// A vehicle featured in a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementCar {
    pub model: String,
    pub year: u16,
    pub price_from: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub image: String,
    pub highlight: bool,
}

/// A campaign page for one tenant and language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: u64,
    pub tenant_id: String,
    pub slug: String,
    pub lang: String,
    pub title: String,
    pub description: String,
    pub cta_label: String,
    pub hero_image: String,
    /// ISO-8601 date.
    pub valid_until: String,
    #[serde(default)]
    pub cars: Vec<AnnouncementCar>,
}

impl Announcement {
    /// Cars flagged as highlights.
    pub fn highlights(&self) -> impl Iterator<Item = &AnnouncementCar> {
        self.cars.iter().filter(|car| car.highlight)
    }
}

/// One translated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    pub id: u64,
    pub tenant_id: String,
    pub lang: String,
    pub key: String,
    pub value: String,
}

/// Key to translated string.
pub type TranslationMap = BTreeMap<String, String>;

/// Fold entries into a map; a repeated key keeps its last value.
pub fn build_translation_map<I>(entries: I) -> TranslationMap
where
    I: IntoIterator<Item = TranslationEntry>,
{
    entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect()
}

/// Partial tenant update sent by the admin app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<TenantTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<TenantSeo>,
}

impl TenantPatch {
    /// Update only the theme.
    pub fn theme(theme: TenantTheme) -> Self {
        Self {
            theme: Some(theme),
            seo: None,
        }
    }

    /// Update only the SEO block.
    pub fn seo(seo: TenantSeo) -> Self {
        Self {
            theme: None,
            seo: Some(seo),
        }
    }

    /// Nothing to update.
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.seo.is_none()
    }
}
