//! Resize Proxy - On-the-fly image resizing and transcoding.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resize_proxy::{
    config::Config,
    io::HttpOriginFetcher,
    proxy::ProxyService,
    resolve::TargetResolver,
    server::{create_router, RouterConfig},
    transform::TransformPipeline,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner(&config);

    let fetcher = match HttpOriginFetcher::new(config.fetch_timeout(), config.max_source_bytes) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = TransformPipeline::new(config.encode_profiles(), config.max_source_pixels);
    let resolver = TargetResolver::new(config.default_max_edge);
    let service = ProxyService::new(fetcher, pipeline, resolver)
        .with_max_concurrent_transforms(config.max_concurrent_transforms);

    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -H 'Accept: image/webp' 'http://{}/?url=<image-url>&mobile'",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner and effective configuration.
fn print_banner(config: &Config) {
    info!("");
    info!("resize-proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("");
    info!("Configuration:");
    info!("  Default max edge: {}px", config.default_max_edge);
    info!(
        "  Source limits: {} MiB, {} megapixels",
        config.max_source_bytes / (1024 * 1024),
        config.max_source_pixels / 1_000_000
    );
    info!("  Fetch timeout: {}s", config.fetch_timeout_secs);
    info!(
        "  Concurrent transforms: {}",
        config.max_concurrent_transforms
    );
    info!(
        "  Encoding: JPEG q{}, AVIF q{} effort {}, WebP lossless",
        config.jpeg_quality, config.avif_quality, config.avif_effort
    );
    info!("  Cache max-age: {}s", config.cache_max_age);
    match &config.cors_origins {
        Some(origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "resize_proxy=debug,tower_http=debug"
    } else {
        "resize_proxy=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build router configuration from CLI config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_cache_max_age(config.cache_max_age);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
