use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS
        // ========================================
        // D402 Sales Performance Dashboard
        .route(
            "/api/d402/filter_options",
            post(handlers::d402_sales_performance::get_filter_options),
        )
        .route(
            "/api/d402/dashboard",
            post(handlers::d402_sales_performance::get_dashboard),
        )
        .route(
            "/api/d402/aggregate",
            post(handlers::d402_sales_performance::run_aggregate),
        )
        .route(
            "/api/d402/records",
            post(handlers::d402_sales_performance::get_records),
        )
}
