use std::fs;
use std::path::Path;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use server::{ServerConfig, router};
use tower::ServiceExt;

fn site(root: &Path) -> ServerConfig {
    let public = root.join("public");
    fs::create_dir_all(public.join("images")).unwrap();
    fs::create_dir_all(public.join("css")).unwrap();
    fs::create_dir_all(public.join("js")).unwrap();
    fs::write(public.join("index.html"), "<!doctype html><title>home</title>").unwrap();
    fs::write(public.join("css/site.css"), "body{margin:0}").unwrap();
    fs::write(public.join("js/app.js"), "console.log('sitekit');\n".repeat(20)).unwrap();
    fs::write(public.join("images/hero.png"), vec![7u8; 512]).unwrap();
    ServerConfig {
        public_dir: public,
        ..ServerConfig::default()
    }
}

async fn get(config: &ServerConfig, uri: &str, gzip: bool) -> Response {
    let mut request = Request::builder().uri(uri);
    if gzip {
        request = request.header(header::ACCEPT_ENCODING, "gzip");
    }
    router(config)
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn health_endpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let config = site(tmp.path());

    let response = get(&config, "/api/health", false).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::X_CONTENT_TYPE_OPTIONS), Some("nosniff"));
    assert_eq!(
        response.headers().get("x-dns-prefetch-control").unwrap(),
        "on"
    );
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn directory_listing_is_forbidden() {
    let tmp = tempfile::tempdir().unwrap();
    let config = site(tmp.path());

    let response = get(&config, "/images/", false).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "Forbidden");
}

#[tokio::test]
async fn client_routes_fall_back_to_index() {
    let tmp = tempfile::tempdir().unwrap();
    let config = site(tmp.path());

    let response = get(&config, "/services", false).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CACHE_CONTROL),
        Some("no-store, no-cache, must-revalidate, proxy-revalidate")
    );
    assert_eq!(header_str(&response, header::PRAGMA), Some("no-cache"));
    assert_eq!(header_str(&response, header::EXPIRES), Some("0"));
    assert!(body_text(response).await.contains("<title>home</title>"));
}

#[tokio::test]
async fn assets_get_long_lived_cache_headers() {
    let tmp = tempfile::tempdir().unwrap();
    let config = site(tmp.path());

    let response = get(&config, "/css/site.css", false).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CACHE_CONTROL),
        Some("public, max-age=31536000")
    );
    let expires = header_str(&response, header::EXPIRES).unwrap();
    let at = chrono::DateTime::parse_from_rfc2822(expires).unwrap();
    assert!(at > chrono::Utc::now());

    let html = get(&config, "/index.html", false).await;
    assert_eq!(header_str(&html, header::CACHE_CONTROL), Some("no-cache"));
}

#[tokio::test]
async fn compresses_text_but_not_images() {
    let tmp = tempfile::tempdir().unwrap();
    let config = site(tmp.path());

    let script = get(&config, "/js/app.js", true).await;
    assert_eq!(script.status(), StatusCode::OK);
    assert_eq!(header_str(&script, header::CONTENT_ENCODING), Some("gzip"));

    let image = get(&config, "/images/hero.png", true).await;
    assert_eq!(image.status(), StatusCode::OK);
    assert_eq!(header_str(&image, header::CONTENT_ENCODING), None);
}

#[tokio::test]
async fn compression_can_be_disabled() {
    let tmp = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        compression: false,
        ..site(tmp.path())
    };

    let script = get(&config, "/js/app.js", true).await;
    assert_eq!(header_str(&script, header::CONTENT_ENCODING), None);
}

#[test]
fn config_defaults_to_port_5000() {
    let config: ServerConfig = toml::from_str("public_dir = \"build\"").unwrap();
    assert_eq!(config.port, 5000);
    assert_eq!(config.addr(), "0.0.0.0:5000");
    assert!(config.compression);
}
