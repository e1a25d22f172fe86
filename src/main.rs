mod cli;
mod config;
mod probe;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use assets::SourceKind;
use clap::Parser;
use media::ImageOptions;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use crate::cli::{AssetStep, Cli, Command, ProbeArgs, ServeArgs};
use crate::config::SiteConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = SiteConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve(args) => serve(config, args),
        Command::Assets { step } => assets(&config, step),
        Command::Probe(args) => probe(&config, args),
    }
}

fn serve(config: SiteConfig, args: ServeArgs) -> Result<ExitCode> {
    let mut server = config.server;
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(bind) = args.bind {
        server.bind = bind;
    }
    if let Some(public_dir) = args.public_dir {
        server.public_dir = public_dir;
    }
    if args.no_compression {
        server.compression = false;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(server::serve(&server))?;
    Ok(ExitCode::SUCCESS)
}

fn assets(config: &SiteConfig, step: AssetStep) -> Result<ExitCode> {
    let pipeline = config.pipeline();
    let host = config.site_host();

    let failures = match step {
        AssetStep::Rename => assets::rename_sources(&pipeline)?.failed,
        AssetStep::Webp => assets::generate_webp_siblings(&pipeline.image_dirs)?.failed,
        AssetStep::Minify => {
            let css = assets::minify_sources(&pipeline, SourceKind::Css)?;
            let js = assets::minify_sources(&pipeline, SourceKind::Js)?;
            css.failed + js.failed
        }
        AssetStep::ImgTags => assets::rewrite_html(&pipeline)?.failed,
        AssetStep::Headers => {
            assets::write_server_configs(&pipeline.config_dir, &pipeline.public_dir, host)?;
            0
        }
        AssetStep::Publish => assets::publish_sources(&pipeline)?.failed,
        AssetStep::All => assets::run_pipeline(&pipeline, host)?.failures(),
    };

    if failures > 0 {
        tracing::warn!("{failures} file(s) failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn probe(config: &SiteConfig, args: ProbeArgs) -> Result<ExitCode> {
    let options = ImageOptions {
        placeholder: config.site.placeholder.clone(),
        site_host: config
            .site
            .host
            .clone()
            .or_else(|| args.base.host_str().map(str::to_string)),
        ..ImageOptions::default()
    };

    let outcomes = probe::probe(
        &args.base,
        &args.sources,
        &options,
        Duration::from_secs(args.timeout_secs),
    )?;

    for outcome in &outcomes {
        println!("{outcome}");
    }
    if outcomes.iter().any(probe::ProbeOutcome::is_errored) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
