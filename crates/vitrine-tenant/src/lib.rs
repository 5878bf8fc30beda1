//! Shared tenant domain for the Vitrine apps.
//!
//! Record types for tenants, campaign announcements and translations, plus
//! [`TenantApi`], a client for the JSON stores that hold them.
//!
//! ```no_run
//! use vitrine_tenant::{TenantApi, TenantApiConfig};
//!
//! # async fn demo() -> Result<(), vitrine_tenant::TenantApiError> {
//! let api = TenantApi::new(TenantApiConfig::default())?;
//! let tenant = api.tenant("acme").await?;
//! let lang = tenant.lang_or_default(None).to_string();
//! let strings = api.translations(&tenant.id, &lang).await?;
//! println!("{} ({} strings)", tenant.seo_or_default().title, strings.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod domain;
mod error;

pub use client::{TenantApi, TenantApiConfig};
pub use domain::{
    build_translation_map, Announcement, AnnouncementCar, Tenant, TenantPatch, TenantSeo,
    TenantTheme, TranslationEntry, TranslationMap, DEFAULT_SEO_DESCRIPTION,
};
pub use error::TenantApiError;
