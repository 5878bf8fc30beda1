//! TenantApi against an in-process stub of the JSON stores.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};
use vitrine_tenant::{
    TenantApi, TenantApiConfig, TenantApiError, TenantPatch, TenantSeo, TenantTheme,
};

type Params = Query<HashMap<String, String>>;

#[derive(Clone)]
struct Store {
    tenants: Arc<Mutex<Vec<Value>>>,
    announcements: Arc<Vec<Value>>,
    translations: Arc<Vec<Value>>,
}

/// Keep rows whose fields equal every query parameter.
fn filter(rows: &[Value], params: &HashMap<String, String>) -> Vec<Value> {
    rows.iter()
        .filter(|row| {
            params.iter().all(|(key, want)| match &row[key] {
                Value::String(s) => s == want,
                Value::Number(n) => n.to_string() == *want,
                _ => false,
            })
        })
        .cloned()
        .collect()
}

async fn list_tenants(State(store): State<Store>, Query(params): Params) -> Json<Vec<Value>> {
    let tenants = store.tenants.lock().unwrap();
    Json(filter(&tenants, &params))
}

async fn patch_tenant(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut tenants = store.tenants.lock().unwrap();
    let tenant = tenants
        .iter_mut()
        .find(|t| t["id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    if let (Value::Object(target), Value::Object(changes)) = (tenant, body) {
        for (key, value) in changes {
            target.insert(key, value);
        }
    }
    let updated = tenants
        .iter()
        .find(|t| t["id"] == id.as_str())
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(updated))
}

async fn list_announcements(State(store): State<Store>, Query(params): Params) -> Json<Vec<Value>> {
    Json(filter(&store.announcements, &params))
}

async fn list_translations(State(store): State<Store>, Query(params): Params) -> Json<Vec<Value>> {
    Json(filter(&store.translations, &params))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

fn tenant(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "domain": format!("{id}.localhost"),
        "defaultLang": "pt-BR",
        "supportedLangs": ["pt-BR", "en-US"],
        "theme": { "primary": "#0f172a", "secondary": "#f97316" },
        "logoUrl": format!("/logos/{id}.svg"),
        "country": "BR"
    })
}

fn announcement(id: u64, tenant_id: &str) -> Value {
    json!({
        "id": id,
        "tenantId": tenant_id,
        "slug": format!("campanha-{id}"),
        "lang": "pt-BR",
        "title": "Feirão",
        "description": "Ofertas da semana",
        "ctaLabel": "Ver ofertas",
        "heroImage": "/img/hero.jpg",
        "validUntil": "2025-12-31",
        "cars": [
            { "model": "Onix", "year": 2022, "priceFrom": 69990, "image": "/img/onix.jpg", "highlight": true }
        ]
    })
}

fn translation(id: u64, tenant_id: &str, lang: &str, key: &str, value: &str) -> Value {
    json!({ "id": id, "tenantId": tenant_id, "lang": lang, "key": key, "value": value })
}

async fn start_stub() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let store = Store {
        tenants: Arc::new(Mutex::new(vec![
            tenant("acme", "ACME Motors"),
            tenant("zeta", "Zeta Veículos"),
            tenant("filial/sp", "Filial São Paulo"),
        ])),
        announcements: Arc::new(vec![
            announcement(1, "acme"),
            announcement(2, "acme"),
            announcement(3, "zeta"),
        ]),
        translations: Arc::new(vec![
            translation(1, "acme", "pt-BR", "home.title", "Bem-vindo"),
            translation(2, "acme", "pt-BR", "home.cta", "Ver ofertas"),
            translation(3, "acme", "en-US", "home.title", "Welcome"),
            translation(4, "acme", "pt-BR", "home.title", "Olá"),
        ]),
    };

    let app = Router::new()
        .route("/tenants", get(list_tenants))
        .route("/tenants/:id", patch(patch_tenant))
        .route("/announcements", get(list_announcements))
        .route("/translations", get(list_translations))
        .route("/broken", get(broken))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn api_for(addr: SocketAddr) -> TenantApi {
    let config = TenantApiConfig {
        tenants_url: format!("http://{addr}/tenants"),
        announcements_url: format!("http://{addr}/announcements"),
        translations_url: format!("http://{addr}/translations"),
        ..TenantApiConfig::default()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    TenantApi::with_client(config, http)
}

#[tokio::test]
async fn test_fetch_tenant() {
    let (addr, _server) = start_stub().await;
    let api = api_for(addr);

    let tenant = api.tenant("zeta").await.unwrap();
    assert_eq!(tenant.name, "Zeta Veículos");
    assert_eq!(tenant.seo_or_default().title, "Zeta Veículos — Seminovos e ofertas");

    let err = api.tenant("ghost").await.unwrap_err();
    assert!(matches!(
        err,
        TenantApiError::NotFound { kind: "tenant", ref id } if id == "ghost"
    ));
}

#[tokio::test]
async fn test_announcements_are_scoped_to_tenant() {
    let (addr, _server) = start_stub().await;
    let api = api_for(addr);

    let list = api.announcements("acme").await.unwrap();
    assert_eq!(list.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);

    let one = api.announcement("acme", "2").await.unwrap();
    assert_eq!(one.slug, "campanha-2");

    // Exists, but belongs to another tenant.
    let err = api.announcement("acme", "3").await.unwrap_err();
    assert!(matches!(err, TenantApiError::NotFound { kind: "announcement", .. }));
}

#[tokio::test]
async fn test_translations_map() {
    let (addr, _server) = start_stub().await;
    let api = api_for(addr);

    let pt = api.translations("acme", "pt-BR").await.unwrap();
    assert_eq!(pt.len(), 2);
    assert_eq!(pt["home.title"], "Olá");

    let en = api.translations("acme", "en-US").await.unwrap();
    assert_eq!(en["home.title"], "Welcome");

    assert!(api.translations("zeta", "pt-BR").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_patch_tenant() {
    let (addr, _server) = start_stub().await;
    let api = api_for(addr);

    let patch = TenantPatch {
        theme: Some(TenantTheme {
            primary: "#000000".into(),
            secondary: "#ffffff".into(),
        }),
        seo: Some(TenantSeo {
            title: "ACME".into(),
            description: "Seminovos".into(),
        }),
    };
    let updated = api.patch_tenant("acme", &patch).await.unwrap();
    assert_eq!(updated.theme.primary, "#000000");
    assert_eq!(updated.seo.as_ref().unwrap().title, "ACME");

    let reread = api.tenant("acme").await.unwrap();
    assert_eq!(reread, updated);

    let err = api
        .patch_tenant("ghost", &TenantPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TenantApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_patch_tenant_id_is_one_path_segment() {
    let (addr, _server) = start_stub().await;
    let api = api_for(addr);

    let patch = TenantPatch {
        seo: Some(TenantSeo {
            title: "Filial SP".into(),
            description: "Seminovos em São Paulo".into(),
        }),
        ..TenantPatch::default()
    };
    let updated = api.patch_tenant("filial/sp", &patch).await.unwrap();
    assert_eq!(updated.id, "filial/sp");
    assert_eq!(updated.seo.as_ref().unwrap().title, "Filial SP");

    let reread = api.tenant("filial/sp").await.unwrap();
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn test_error_status_names_url() {
    let (addr, _server) = start_stub().await;
    let config = TenantApiConfig {
        tenants_url: format!("http://{addr}/broken"),
        ..TenantApiConfig::default()
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let api = TenantApi::with_client(config, http);

    let err = api.tenant("acme").await.unwrap_err();
    match &err {
        TenantApiError::Status { method, url, status } => {
            assert_eq!(*method, "GET");
            assert_eq!(*status, 500);
            assert!(url.ends_with("/broken?id=acme"), "{url}");
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert!(err.to_string().contains("failed with status 500"));
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = api_for(addr);
    let err = api.tenant("acme").await.unwrap_err();
    assert!(matches!(err, TenantApiError::Http(_)));
}
