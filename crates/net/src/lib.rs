use std::io::Read;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const MAX_BODY_BYTES: u64 = 20 * 1024 * 1024;
const USER_AGENT: &str = "sitekit-probe/0.1";

#[derive(Clone, Debug)]
pub struct FetchResult {
    pub url: String,           // final URL after redirects
    pub requested_url: String, // what we asked for
    pub status: Option<u16>,
    pub bytes: usize,
    pub content_type: Option<String>,
    pub duration_ms: u128,
    pub error: Option<String>,
}

impl FetchResult {
    fn failed(requested_url: &str, start: Instant, error: String) -> Self {
        Self {
            url: requested_url.to_string(),
            requested_url: requested_url.to_string(),
            status: None,
            bytes: 0,
            content_type: None,
            duration_ms: start.elapsed().as_millis(),
            error: Some(error),
        }
    }

    /// What a browser `<img>` would treat as a successful load: a 2xx
    /// response with a non-empty body whose content type (if any) is an image.
    /// SPA fallbacks answering with `text/html` count as failures.
    pub fn is_image(&self) -> bool {
        let ok_status = self.status.is_some_and(|s| (200..300).contains(&s));
        let ok_type = self
            .content_type
            .as_deref()
            .is_none_or(|ct| ct.trim_start().to_ascii_lowercase().starts_with("image/"));
        self.error.is_none() && ok_status && ok_type && self.bytes > 0
    }
}

fn tls_config() -> Arc<rustls::ClientConfig> {
    static CONFIG: OnceLock<Arc<rustls::ClientConfig>> = OnceLock::new();
    CONFIG
        .get_or_init(|| {
            let mut roots = rustls::RootCertStore::empty();
            let native = rustls_native_certs::load_native_certs();
            for err in &native.errors {
                log::warn!(target: "net", "native cert error: {err}");
            }
            let (added, ignored) = roots.add_parsable_certificates(native.certs);
            log::debug!(target: "net", "loaded {added} native roots ({ignored} ignored)");

            let config = rustls::ClientConfig::builder_with_provider(Arc::new(
                rustls::crypto::ring::default_provider(),
            ))
            .with_safe_default_protocol_versions()
            .map(|builder| {
                builder
                    .with_root_certificates(roots.clone())
                    .with_no_client_auth()
            })
            .unwrap_or_else(|err| {
                log::warn!(target: "net", "tls setup failed ({err}), using defaults");
                rustls::ClientConfig::builder()
                    .with_root_certificates(roots)
                    .with_no_client_auth()
            });
            Arc::new(config)
        })
        .clone()
}

pub fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .tls_config(tls_config())
        .build()
}

/// Blocking GET that reads (and discards) the body so the byte count and
/// content type reflect what a renderer would have received.
pub fn fetch_blocking(agent: &ureq::Agent, url: &str) -> FetchResult {
    let start = Instant::now();

    let resp = match agent.get(url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, resp)) => {
            return FetchResult {
                url: resp.get_url().to_string(),
                requested_url: url.to_string(),
                status: Some(code),
                bytes: 0,
                content_type: resp.header("content-type").map(str::to_string),
                duration_ms: start.elapsed().as_millis(),
                error: Some(format!("http status {code}")),
            };
        }
        Err(err) => return FetchResult::failed(url, start, err.to_string()),
    };

    let status = resp.status();
    let final_url = resp.get_url().to_string();
    let content_type = resp.header("content-type").map(str::to_string);

    let mut buf = Vec::new();
    if let Err(err) = resp
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut buf)
    {
        return FetchResult::failed(url, start, err.to_string());
    }

    FetchResult {
        url: final_url,
        requested_url: url.to_string(),
        status: Some(status),
        bytes: buf.len(),
        content_type,
        duration_ms: start.elapsed().as_millis(),
        error: None,
    }
}

pub fn fetch(
    agent: ureq::Agent,
    url: String,
    cancel: Arc<AtomicBool>,
    cb: Arc<dyn Fn(FetchResult) + Send + Sync>,
) {
    thread::spawn(move || {
        let start = Instant::now();
        if cancel.load(Ordering::Acquire) {
            cb(FetchResult::failed(&url, start, "cancelled".to_string()));
            return;
        }

        let result = fetch_blocking(&agent, &url);

        if cancel.load(Ordering::Acquire) {
            cb(FetchResult::failed(&url, start, "cancelled".to_string()));
        } else {
            cb(result);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(content_type: Option<&str>, bytes: usize) -> FetchResult {
        FetchResult {
            url: "http://localhost/a.png".into(),
            requested_url: "http://localhost/a.png".into(),
            status: Some(200),
            bytes,
            content_type: content_type.map(str::to_string),
            duration_ms: 1,
            error: None,
        }
    }

    #[test]
    fn image_needs_image_content_type_and_body() {
        assert!(ok(Some("image/png"), 10).is_image());
        assert!(ok(Some("IMAGE/webp"), 10).is_image());
        assert!(ok(None, 10).is_image());
        assert!(!ok(Some("text/html; charset=utf-8"), 10).is_image());
        assert!(!ok(Some("image/png"), 0).is_image());
    }

    #[test]
    fn errors_are_never_images() {
        let mut r = ok(Some("image/png"), 10);
        r.status = Some(404);
        assert!(!r.is_image());

        let r = FetchResult::failed("http://x/", Instant::now(), "refused".into());
        assert!(!r.is_image());
        assert_eq!(r.error.as_deref(), Some("refused"));
    }
}
