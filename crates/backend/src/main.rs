use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use backend::dashboards::d402_sales_performance::{cache, catalog::DimensionCatalog, service};
use backend::routes::configure_routes;
use backend::shared::config;
use backend::shared::format::format_number;
use backend::system;

// Простой middleware для логирования запросов
async fn request_logger(req: Request<Body>, next: Next) -> Response {
    use axum::body::to_bytes;

    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} (body read failed: {})",
                method,
                uri.path(),
                parts.status.as_u16(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    tracing::info!(
        "{:>5}ms | {:>12} | {} {:>6} {}",
        start.elapsed().as_millis(),
        format_number(bytes.len() as u64),
        parts.status.as_u16(),
        method,
        uri.path()
    );

    Response::from_parts(parts, Body::from(bytes))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    let settings = service::ServiceSettings::from(&config);

    let catalog = DimensionCatalog::default();
    catalog
        .validate(true)
        .map_err(|e| anyhow::anyhow!("dimension catalog is invalid: {e}"))?;
    cache::initialize(catalog, config.generator.cache_limits());
    service::initialize(settings);

    // Прогреваем кэш набором данных по умолчанию
    let default_data = cache::get_dataset(&settings.default_dataset)
        .map_err(|e| anyhow::anyhow!("default dataset generation failed: {e}"))?;
    tracing::info!(
        "Default dataset ready: {}..{} seed {} ({} records)",
        settings.default_dataset.start_date,
        settings.default_dataset.end_date,
        settings.default_dataset.seed,
        default_data.len()
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = configure_routes()
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "invalid server address {}:{}: {e}",
                config.server.host,
                config.server.port
            )
        })?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
