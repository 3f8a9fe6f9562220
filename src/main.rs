mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Backend, Config};
use crate::core::memory_db::MemoryDatabase;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth;
use crate::features::favorites::repositories::{FavoriteRepository, PgFavoriteRepository};
use crate::features::favorites::{routes as favorites_routes, FavoriteService};
use crate::features::files::repositories::{FileRepository, PgFileRepository};
use crate::features::files::{routes as files_routes, FileService, PurgeWorker};
use crate::features::users::repositories::{PgUserRepository, UserRepository};
use crate::features::users::{routes as users_routes, IdentityService};
use crate::modules::storage::{BlobStore, MemoryBlobStore, MinIOClient};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Repositories and blob store for the configured backend
struct Stores {
    users: Arc<dyn UserRepository>,
    files: Arc<dyn FileRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    blobs: Arc<dyn BlobStore>,
}

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn connect_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.app.backend {
        Backend::Postgres => {
            let pool = database::create_pool(&config.database).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            let minio_client = MinIOClient::new(config.minio.clone())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;

            Ok(Stores {
                users: Arc::new(PgUserRepository::new(pool.clone())),
                files: Arc::new(PgFileRepository::new(pool.clone())),
                favorites: Arc::new(PgFavoriteRepository::new(pool)),
                blobs: Arc::new(minio_client),
            })
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory backend; all data is lost on restart");
            let db = Arc::new(MemoryDatabase::new());
            Ok(Stores {
                users: db.clone(),
                files: db.clone(),
                favorites: db,
                blobs: Arc::new(MemoryBlobStore::new()),
            })
        }
    }
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully (backend: {:?})", config.app.backend);

    let stores = connect_stores(&config).await?;

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized (issuer: {})", config.auth.issuer);

    // Initialize services
    let identity_service = Arc::new(IdentityService::new(stores.users));
    let favorite_service = Arc::new(FavoriteService::new(
        stores.favorites,
        Arc::clone(&stores.files),
        Arc::clone(&identity_service),
    ));
    let file_service = Arc::new(FileService::new(
        stores.files,
        stores.blobs,
        Arc::clone(&identity_service),
        Arc::clone(&favorite_service),
        config.purge.clone(),
    ));
    tracing::info!("Services initialized");

    // Spawn purge worker
    if config.purge.enabled {
        let purge_worker = PurgeWorker::new(Arc::clone(&file_service), config.purge.interval);
        tokio::spawn(async move {
            purge_worker.run().await;
        });
        tracing::info!("Purge worker spawned");
    } else {
        tracing::info!("Purge worker disabled");
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                "Swagger UI",
            )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Admin routes (basic auth, only when configured)
    let admin = if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Admin routes enabled");
        let admin_service = Arc::new(AdminService::new(
            Arc::clone(&identity_service),
            Arc::clone(&file_service),
        ));
        Router::new().nest(
            "/api/admin",
            admin_routes::routes(admin_service, Arc::new(credentials)),
        )
    } else {
        tracing::info!("Admin routes disabled (no credentials configured)");
        Router::new()
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(users_routes::routes(Arc::clone(&identity_service)))
        .merge(files_routes::protected_routes(Arc::clone(&file_service)))
        .merge(favorites_routes::protected_routes(Arc::clone(
            &favorite_service,
        )))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public reads: identity is optional, failures produce empty results
    let public_routes = Router::new()
        .merge(files_routes::public_routes(file_service))
        .merge(favorites_routes::public_routes(favorite_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator,
            middleware::optional_auth_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(admin)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
