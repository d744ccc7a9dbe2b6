//! Gallery Server - a private image gallery over pluggable storage.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_server::{
    config::{Config, StorageBackend},
    create_router, create_s3_client,
    gallery::GalleryService,
    server::{OAuthSettings, RouterConfig},
    store::{ArtworkStore, LocalStore, S3Store},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Gallery Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");

    if config.auth_enabled {
        info!("  Auth: enabled ({} allowed email(s))", config.allowed_emails.len());
    } else {
        warn!("  Auth: DISABLED - uploads and deletes are open to anyone");
        warn!("        Enable for production: --session-secret=<secret> --allowed-emails=<emails>");
    }

    match config.storage {
        StorageBackend::Local => run_local(config).await,
        StorageBackend::S3 => run_s3(config).await,
    }
}

// =============================================================================
// Backend Setup
// =============================================================================

async fn run_local(config: Config) -> ExitCode {
    info!("  Storage: local directory {}", config.local_dir);

    let store = LocalStore::new(&config.local_dir, &config.local_public_base);
    if let Err(e) = store.ensure_ready().await {
        error!("Failed to prepare artwork directory: {}", e);
        return ExitCode::FAILURE;
    }

    match store.list().await {
        Ok(artworks) => info!("  Found {} artwork(s) on disk", artworks.len()),
        Err(e) => {
            error!("Failed to read artwork directory: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let serve_dir = Some(config.local_dir.clone());
    serve(store, &config, serve_dir).await
}

async fn run_s3(config: Config) -> ExitCode {
    let bucket = config.bucket_or_empty().to_string();

    info!("  Storage: s3 bucket {}", bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);

    let client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    info!("Connecting to S3...");
    match client
        .list_objects_v2()
        .bucket(&bucket)
        .max_keys(1)
        .send()
        .await
    {
        Ok(_) => info!("  Connected successfully"),
        Err(e) => {
            error!("  Failed to connect to S3: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - Your AWS credentials are configured correctly");
            error!("    - The bucket '{}' exists and is accessible", bucket);
            error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
            return ExitCode::FAILURE;
        }
    }

    let store = S3Store::new(
        client,
        bucket,
        config.s3_prefix.clone(),
        config.s3_endpoint.clone(),
        config.s3_region.clone(),
    );

    serve(store, &config, None).await
}

// =============================================================================
// Server
// =============================================================================

async fn serve<S: ArtworkStore>(
    store: S,
    config: &Config,
    serve_dir: Option<String>,
) -> ExitCode {
    let service = GalleryService::with_max_upload_bytes(store, config.max_upload_bytes);
    let router_config = build_router_config(config, serve_dir);
    let router = create_router(service, router_config);

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/artworks", addr);
    if config.auth_enabled {
        info!("");
        info!("  Sign in:");
        info!("    open http://{}/auth/google/login", addr);
    }
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

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config, serve_dir: Option<String>) -> RouterConfig {
    let mut router_config = if config.auth_enabled {
        let mut rc = RouterConfig::new(config.session_secret_or_empty())
            .with_allowed_emails(config.allowed_emails.clone())
            .with_session_ttl_secs(config.session_ttl)
            .with_post_login_redirect(config.post_login_redirect.clone());

        // validate() has already required these three when auth is on.
        if let (Some(id), Some(secret), Some(redirect)) = (
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.oauth_redirect_url.clone(),
        ) {
            rc = rc.with_oauth(OAuthSettings {
                client_id: id,
                client_secret: secret,
                redirect_url: redirect,
                auth_endpoint: None,
                token_endpoint: None,
                userinfo_endpoint: None,
            });
        }
        rc
    } else {
        RouterConfig::without_auth()
    };

    router_config = router_config
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(dir) = serve_dir {
        router_config = router_config.with_serve_dir(dir);
    }

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "gallery_server=debug,tower_http=debug"
    } else {
        "gallery_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
