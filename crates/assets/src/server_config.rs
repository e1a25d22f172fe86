use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetError, Result};
use crate::policy::{
    AssetClass, DATA_EXTENSIONS, FONT_EXTENSIONS, HTML_EXTENSIONS, IMAGE_EXTENSIONS,
    SCRIPT_EXTENSIONS, STYLE_EXTENSIONS,
};
use crate::walk::ensure_dir;

pub const NGINX_FILE: &str = "nginx.conf";
pub const HTACCESS_FILE: &str = ".htaccess";

const GZIP_TYPES: [&str; 10] = [
    "application/javascript",
    "application/json",
    "application/manifest+json",
    "application/xml",
    "font/opentype",
    "image/svg+xml",
    "image/x-icon",
    "text/css",
    "text/plain",
    "text/xml",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerConfigReport {
    pub written: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

fn alternation(lists: &[&[&str]]) -> String {
    lists.iter().flat_map(|l| l.iter()).copied().collect::<Vec<_>>().join("|")
}

fn cache_control(class: AssetClass) -> &'static str {
    class.policy().map(|p| p.cache_control).unwrap_or_default()
}

pub fn nginx_config(host: &str) -> String {
    let long_lived = cache_control(AssetClass::Image);
    let html = cache_control(AssetClass::Html);
    let data = cache_control(AssetClass::Data);
    let static_exts = alternation(&[&IMAGE_EXTENSIONS, &SCRIPT_EXTENSIONS, &STYLE_EXTENSIONS]);
    let font_exts = alternation(&[&FONT_EXTENSIONS]);
    let html_exts = alternation(&[&HTML_EXTENSIONS]);
    let data_exts = alternation(&[&DATA_EXTENSIONS]);
    let gzip_types = GZIP_TYPES.join(" ");

    format!(
        r#"# Generated by sitekit. Edits are kept on later runs.
server {{
    listen 80;
    server_name {host} www.{host};
    return 301 https://$host$request_uri;
}}

server {{
    listen 443 ssl http2;
    server_name {host} www.{host};
    root /var/www/{host};
    index index.html;

    location ~* \.({static_exts})$ {{
        expires 1y;
        add_header Cache-Control "{long_lived}, immutable";
        access_log off;
    }}

    location ~* \.({font_exts})$ {{
        expires 1y;
        add_header Cache-Control "{long_lived}, immutable";
        access_log off;
    }}

    location ~* \.({html_exts})$ {{
        expires 1d;
        add_header Cache-Control "{html}";
    }}

    location ~* \.({data_exts})$ {{
        expires 1d;
        add_header Cache-Control "{data}";
    }}

    location / {{
        try_files $uri $uri/ /index.html;
    }}

    autoindex off;

    add_header X-Content-Type-Options nosniff;
    add_header X-Frame-Options SAMEORIGIN;
    add_header X-DNS-Prefetch-Control on;

    gzip on;
    gzip_comp_level 6;
    gzip_min_length 256;
    gzip_proxied any;
    gzip_types {gzip_types};
}}
"#
    )
}

pub fn htaccess() -> String {
    const EXPIRES: [(&str, &str); 13] = [
        ("image/jpeg", "1 year"),
        ("image/png", "1 year"),
        ("image/gif", "1 year"),
        ("image/webp", "1 year"),
        ("image/avif", "1 year"),
        ("image/svg+xml", "1 year"),
        ("image/x-icon", "1 year"),
        ("text/css", "1 year"),
        ("application/javascript", "1 year"),
        ("font/woff2", "1 year"),
        ("font/woff", "1 year"),
        ("application/json", "1 day"),
        ("text/html", "1 day"),
    ];

    let gzip_types = GZIP_TYPES.join(" ");
    let expires: String = EXPIRES
        .iter()
        .map(|(mime, age)| format!("  ExpiresByType {mime} \"access plus {age}\"\n"))
        .collect();

    format!(
        r#"# Generated by sitekit. Edits are kept on later runs.

<IfModule mod_deflate.c>
  AddOutputFilterByType DEFLATE text/html {gzip_types}
</IfModule>

<IfModule mod_expires.c>
  ExpiresActive On
{expires}</IfModule>

Options -Indexes

<IfModule mod_headers.c>
  Header set X-Content-Type-Options "nosniff"
  Header set X-Frame-Options "SAMEORIGIN"
  Header set X-DNS-Prefetch-Control "on"
  Header set Referrer-Policy "strict-origin-when-cross-origin"
</IfModule>

<FilesMatch "^\.(htaccess|htpasswd|ini|log|yml|yaml|sh|conf)$">
  Require all denied
</FilesMatch>
"#
    )
}

fn write_if_missing(path: PathBuf, contents: &str, report: &mut ServerConfigReport) -> Result<()> {
    if path.exists() {
        log::info!(target: "assets.headers", "{} already exists, skipping", path.display());
        report.kept.push(path);
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(&path, contents).map_err(AssetError::io(&path))?;
    log::info!(target: "assets.headers", "wrote {}", path.display());
    report.written.push(path);
    Ok(())
}

/// Writes `nginx.conf` into `config_dir` and `.htaccess` into `public_dir`.
/// Existing files are never overwritten.
pub fn write_server_configs(
    config_dir: &Path,
    public_dir: &Path,
    host: &str,
) -> Result<ServerConfigReport> {
    let mut report = ServerConfigReport::default();
    write_if_missing(config_dir.join(NGINX_FILE), &nginx_config(host), &mut report)?;
    write_if_missing(public_dir.join(HTACCESS_FILE), &htaccess(), &mut report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nginx_uses_policy_headers() {
        let conf = nginx_config("example.com");
        assert!(conf.contains("server_name example.com www.example.com;"));
        assert!(conf.contains("add_header Cache-Control \"public, max-age=31536000, immutable\";"));
        assert!(conf.contains("add_header Cache-Control \"public, max-age=86400, must-revalidate\";"));
        assert!(conf.contains("jpg|jpeg|png|gif|ico|svg|webp|avif|js|mjs|css"));
        assert!(conf.contains(
            "location ~* \\.(html|htm)$ {\n        expires 1d;\n        add_header Cache-Control \"no-cache\";"
        ));
        assert!(conf.contains("location ~* \\.(json|xml)$ {"));
        assert!(conf.contains("autoindex off;"));
    }

    #[test]
    fn htaccess_disables_indexes() {
        let conf = htaccess();
        assert!(conf.contains("Options -Indexes"));
        assert!(conf.contains("ExpiresByType image/webp \"access plus 1 year\""));
        assert!(conf.contains("ExpiresByType text/html \"access plus 1 day\""));
    }

    #[test]
    fn existing_files_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let config_dir = tmp.path().join("server");
        let public_dir = tmp.path().join("public");
        fs::create_dir_all(&public_dir).unwrap();
        fs::write(public_dir.join(HTACCESS_FILE), "# hand written").unwrap();

        let report = write_server_configs(&config_dir, &public_dir, "example.com").unwrap();
        assert_eq!(report.written, [config_dir.join(NGINX_FILE)]);
        assert_eq!(report.kept, [public_dir.join(HTACCESS_FILE)]);
        assert_eq!(
            fs::read_to_string(public_dir.join(HTACCESS_FILE)).unwrap(),
            "# hand written"
        );

        let again = write_server_configs(&config_dir, &public_dir, "example.com").unwrap();
        assert!(again.written.is_empty());
        assert_eq!(again.kept.len(), 2);
    }
}
