//! Folio Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_files::Files;
use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use folio_lib::api::{self, BodyLimit};
use folio_lib::auth::AdminKey;
use folio_lib::config::Config;
use folio_lib::db::DbPool;
use folio_lib::middleware::{self, Preflight, RequestLogger};
use folio_lib::services::{self, ImageCache, ImageUploader, ObjectStore, Storage};

/// Perform health check (for container healthchecks).
fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, BLOG_ADMIN_PASSWORD_HASH or BLOG_ADMIN_PASSWORD must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Folio Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and the admin password");
    }

    // Initialize database
    let pool = DbPool::new(&config.database)
        .await
        .map_err(std::io::Error::other)?;
    info!("Database connection established");

    pool.run_migrations().await.map_err(std::io::Error::other)?;
    info!("Database migrations complete");

    // Object storage is optional; uploads fall back to the image cache without it
    let store: Option<Arc<dyn ObjectStore>> = match &config.storage {
        Some(settings) => match Storage::new(settings).await {
            Ok(storage) => Some(Arc::new(storage)),
            Err(e) => {
                warn!("Object storage unavailable, uploads will use the image cache: {}", e);
                None
            }
        },
        None => {
            info!("S3_BUCKET not set, uploads will use the image cache");
            None
        }
    };

    // Start the image cache and its purge task
    let image_cache = ImageCache::new(&config.image_cache);
    services::start_cleanup_task(image_cache.clone(), config.image_cache.purge_interval_secs);
    info!(
        "Image cache ready (ttl: {}s, max entries: {})",
        config.image_cache.ttl_secs, config.image_cache.max_entries
    );

    // Prepare shared state
    let bind_address = config.bind_address();
    let admin_key = AdminKey::new(config.admin_secret.as_ref());
    if !admin_key.is_configured() {
        warn!("No admin password configured - admin actions will be rejected");
    }
    let uploader = ImageUploader::new(store, image_cache.clone(), config.max_upload_size);
    let body_limit = BodyLimit(config.payload_limit());
    let static_dir = config.static_dir.clone();

    info!(
        "Upload limits: {}MB max image size",
        config.max_upload_size / 1024 / 1024
    );

    if let Some(ref dir) = static_dir {
        info!("Static file serving enabled from {:?}", dir);
    }

    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let pool = web::Data::new(pool);
    let admin_key = web::Data::new(admin_key);
    let image_cache = web::Data::new(image_cache);
    let uploader = web::Data::new(uploader);

    // Start HTTP server
    let server = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(middleware::cors_policy())
            // Outside CORS: OPTIONS always gets a bare 204
            .wrap(Preflight)
            .wrap(RequestLogger)
            // Add shared state
            .app_data(pool.clone())
            .app_data(admin_key.clone())
            .app_data(image_cache.clone())
            .app_data(uploader.clone())
            .app_data(body_limit)
            // Configure API routes
            .configure(api::configure_routes);

        // Serve the frontend site (when BLOG_STATIC_DIR is set)
        if let Some(ref dir) = static_dir {
            app = app.service(Files::new("/", dir.clone()).index_file("index.html"));
        }

        app
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
