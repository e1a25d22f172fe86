use std::time::{Instant, SystemTime};

use assets::policy::{AssetClass, Expires, is_directory_listing, is_precompressed};
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

const API_LOG_LIMIT: usize = 80;

pub(crate) async fn block_directory_listing(request: Request<Body>, next: Next) -> Response {
    if is_directory_listing(request.uri().path()) {
        tracing::debug!(path = request.uri().path(), "directory listing blocked");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }
    next.run(request).await
}

pub(crate) async fn cache_headers(request: Request<Body>, next: Next) -> Response {
    let class = AssetClass::for_path(request.uri().path());
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if let Some(policy) = class.policy() {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(policy.cache_control),
        );
        let expires = match policy.expires {
            Expires::Past => HeaderValue::from_static("0"),
            Expires::After(age) => {
                let at: DateTime<Utc> = (SystemTime::now() + age).into();
                match HeaderValue::from_str(&http_date(at)) {
                    Ok(value) => value,
                    Err(_) => HeaderValue::from_static("0"),
                }
            }
        };
        headers.insert(header::EXPIRES, expires);
        if policy.pragma_no_cache {
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }
    }

    headers.insert("x-dns-prefetch-control", HeaderValue::from_static("on"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// Images are already compressed; hide `Accept-Encoding` from the
/// compression layer so it passes them through.
pub(crate) async fn skip_precompressed(mut request: Request<Body>, next: Next) -> Response {
    if is_precompressed(request.uri().path()) {
        request.headers_mut().remove(header::ACCEPT_ENCODING);
    }
    next.run(request).await
}

pub(crate) async fn log_api_requests(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !path.starts_with("/api") {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let start = Instant::now();
    let response = next.run(request).await;
    let line = format!(
        "{method} {path} {} in {}ms",
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    tracing::info!(target: "server.api", "{}", truncate_line(&line, API_LOG_LIMIT));
    response
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub(crate) fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub(crate) fn truncate_line(line: &str, limit: usize) -> String {
    if line.chars().count() <= limit {
        return line.to_string();
    }
    let mut out: String = line.chars().take(limit - 1).collect();
    out.push('…');
    out
}
