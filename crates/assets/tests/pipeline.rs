use std::fs;

use assets::{HTACCESS_FILE, NGINX_FILE, PipelineConfig, run_pipeline};
use image::{Rgb, RgbImage};

#[test]
fn full_pipeline_over_a_site_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default().rooted(tmp.path());

    let uploads = &config.source_dirs[0];
    fs::create_dir_all(uploads).unwrap();
    RgbImage::from_pixel(2, 2, Rgb([200, 10, 10]))
        .save(uploads.join("Hero Banner.png"))
        .unwrap();

    fs::create_dir_all(&config.css_dir).unwrap();
    fs::write(config.css_dir.join("styles.css"), "/* theme */\n.card {\n  padding: 0px;\n}\n").unwrap();
    fs::create_dir_all(&config.js_dir).unwrap();
    fs::write(config.js_dir.join("utilities.js"), "// util\nconst x = 1;\n").unwrap();
    fs::write(config.html_dirs[0].join("index.html"), "<img src=\"/images/hero_banner.png\">")
        .unwrap();
    fs::write(tmp.path().join("generated-icon.png"), b"icon").unwrap();

    let report = run_pipeline(&config, "example.com").unwrap();
    assert_eq!(report.failures(), 0);

    assert_eq!(
        report.renamed.renamed.get("Hero Banner.png").map(String::as_str),
        Some("hero_banner.png")
    );
    let published = config.images_dir.join("hero_banner.png");
    assert!(published.exists());
    assert!(config.images_dir.join("hero_banner.webp").exists());

    assert_eq!(
        fs::read_to_string(config.css_out_dir().join("styles.min.css")).unwrap(),
        ".card{padding:0}"
    );
    assert_eq!(
        fs::read_to_string(config.js_out_dir().join("utilities.min.js")).unwrap(),
        "const x=1;"
    );

    assert!(config.config_dir.join(NGINX_FILE).exists());
    assert!(config.public_dir.join(HTACCESS_FILE).exists());

    assert_eq!(
        fs::read_to_string(config.html_dirs[0].join("index.html")).unwrap(),
        "<img src=\"/images/hero_banner.png\" loading=\"lazy\" decoding=\"async\">"
    );

    // Uploads and their webp siblings are published where the server looks.
    let served = config.publish_images_dir();
    assert!(served.join("hero_banner.png").exists());
    assert!(served.join("hero_banner.webp").exists());
    assert!(config.publish_dir.join("generated-icon.png").exists());

    // Re-running is stable: siblings and configs already exist.
    let again = run_pipeline(&config, "example.com").unwrap();
    assert!(again.webp.converted.is_empty());
    assert!(again.server_configs.written.is_empty());
    assert!(again.img_tags.updated.is_empty());
}
