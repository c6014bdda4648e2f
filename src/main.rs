mod core;
mod features;
mod shared;

use crate::core::config::{Config, ServiceKind};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::loader::{
    routes as loader_routes, GeocodingService, LoadJobService, StationLoader,
};
use crate::features::regions::{routes as regions_routes, RegionService, SourceReader};
use crate::features::search::{routes as search_routes, AggregatorService};
use crate::features::stations::{
    routes as stations_routes, PgStationStore, StationService, StationStore,
};
use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!(
        "Configuration loaded, enabled services: {:?}",
        config.app.enabled_services
    );

    // Database is only opened when a service that persists stations is mounted
    let pool = match &config.database {
        Some(db_config) => {
            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");
            Some(pool)
        }
        None => {
            tracing::info!("No DATABASE_URL configured, running without the station store");
            None
        }
    };

    let store: Option<Arc<dyn StationStore>> = pool
        .clone()
        .map(|pool| Arc::new(PgStationStore::new(pool)) as Arc<dyn StationStore>);
    let require_store = |kind: ServiceKind| {
        store
            .clone()
            .ok_or_else(|| anyhow::anyhow!("{:?} service needs DATABASE_URL", kind))
    };

    let reader = Arc::new(SourceReader::new(config.sources.clone()));

    let mut api = Router::new();

    if config.app.is_enabled(ServiceKind::Regions) {
        let region_service = Arc::new(RegionService::new(Arc::clone(&reader)));
        api = api.merge(regions_routes::routes(region_service));
        tracing::info!("Region services mounted");
    }

    if config.app.is_enabled(ServiceKind::Aggregator) {
        let aggregator_service = Arc::new(
            AggregatorService::new(&config.aggregator)
                .map_err(|e| anyhow::anyhow!("Failed to initialize aggregator: {}", e))?,
        );
        for endpoint in &config.aggregator.endpoints {
            tracing::info!("Aggregating {} from {}", endpoint.name, endpoint.base_url);
        }
        api = api.merge(search_routes::routes(aggregator_service));
    }

    if config.app.is_enabled(ServiceKind::Stations) {
        let station_service = Arc::new(StationService::new(require_store(ServiceKind::Stations)?));
        api = api.merge(stations_routes::routes(station_service));
        tracing::info!("Station search mounted");
    }

    if config.app.is_enabled(ServiceKind::Loader) {
        let geocoder = if config.geocoding.enabled {
            let service = GeocodingService::new(&config.geocoding)
                .map_err(|e| anyhow::anyhow!("Failed to initialize geocoding: {}", e))?;
            tracing::info!("Geocoding enabled via {}", config.geocoding.base_url);
            Some(Arc::new(service))
        } else {
            tracing::info!("Geocoding disabled, fallback coordinates are kept");
            None
        };

        let loader = Arc::new(StationLoader::new(
            require_store(ServiceKind::Loader)?,
            config.loader.clone(),
            geocoder,
        ));
        let load_job_service = Arc::new(LoadJobService::new(
            Arc::clone(&reader),
            loader,
            config.loader.clone(),
        ));
        api = api.merge(loader_routes::routes(load_job_service));
        tracing::info!(
            "Loader mounted (batch size {}, clear page size {})",
            config.loader.batch_size,
            config.loader.clear_page_size
        );
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(middleware::DocsCredentials(credentials)),
                middleware::docs_basic_auth,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let app = Router::new()
        .merge(swagger)
        .merge(api)
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
    socket.set_nodelay(true)?;

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
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
