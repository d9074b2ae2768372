use axum::{http::StatusCode, Json};
use contracts::dashboards::d402_sales_performance::{
    AggregateRequest, AggregateResponse, DashboardRequest, DashboardResponse, DetailTable,
    FilterOptions, FilterOptionsRequest, RecordsRequest,
};

use crate::dashboards::d402_sales_performance::{service, DashboardError};

/// Every dashboard error stems from the request
fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::InvalidConfig(_)
        | DashboardError::UnknownColumn(_)
        | DashboardError::InvalidAggregate(_) => StatusCode::BAD_REQUEST,
    }
}

fn reject(action: &str, error: DashboardError) -> StatusCode {
    tracing::warn!("D402 Dashboard: Failed to {}: {}", action, error);
    status_for(&error)
}

/// Run a service call on the blocking pool; dataset generation is CPU bound
async fn run_blocking<T, F>(action: &'static str, work: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DashboardError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(reject(action, e)),
        Err(e) => {
            tracing::error!("D402 Dashboard: Failed to {}: task aborted: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/d402/filter_options
pub async fn get_filter_options(
    Json(request): Json<FilterOptionsRequest>,
) -> Result<Json<FilterOptions>, StatusCode> {
    tracing::info!(
        "D402 Dashboard: Getting filter options for {} selected dimensions",
        request.selections.len()
    );

    let options = run_blocking("get filter options", move || {
        service::get_filter_options(request)
    })
    .await?;
    Ok(Json(options))
}

/// POST /api/d402/dashboard
pub async fn get_dashboard(
    Json(request): Json<DashboardRequest>,
) -> Result<Json<DashboardResponse>, StatusCode> {
    tracing::info!(
        "D402 Dashboard: Building dashboard (custom filter: {})",
        request.filter.is_some()
    );

    let response = run_blocking("build dashboard", move || service::get_dashboard(request)).await?;
    match &response {
        DashboardResponse::Ready { dashboard } => tracing::info!(
            "D402 Dashboard: Returning dashboard over {} records",
            dashboard.record_count
        ),
        DashboardResponse::NoData { .. } => {
            tracing::info!("D402 Dashboard: No data for the selected filters")
        }
    }
    Ok(Json(response))
}

/// POST /api/d402/aggregate
pub async fn run_aggregate(
    Json(request): Json<AggregateRequest>,
) -> Result<Json<AggregateResponse>, StatusCode> {
    tracing::info!(
        "D402 Dashboard: Aggregating by {} keys with {} measures and {} ratios",
        request.spec.group_by.len(),
        request.spec.measures.len(),
        request.spec.ratios.len()
    );

    let response = run_blocking("aggregate", move || service::run_aggregate(request)).await?;
    Ok(Json(response))
}

/// POST /api/d402/records
pub async fn get_records(
    Json(request): Json<RecordsRequest>,
) -> Result<Json<DetailTable>, StatusCode> {
    let table = run_blocking("get records", move || service::get_records(request)).await?;
    tracing::info!(
        "D402 Dashboard: Returning {} of {} records",
        table.rows.len(),
        table.total_rows
    );
    Ok(Json(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aggregate_request(options: serde_json::Value) -> AggregateRequest {
        serde_json::from_value(json!({
            "filter": {
                "date_range": {"from": "2022-01-01", "to": "2022-01-31"},
                "selections": {"region": ["North"]}
            },
            "spec": {
                "group_by": [{"kind": "dimension", "value": "region"}],
                "measures": [{"column": "revenue", "reducer": "sum"}],
                "options": options
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_request_errors_are_bad_request() {
        for error in [
            DashboardError::InvalidConfig("end before start".to_string()),
            DashboardError::UnknownColumn("sum_tax".to_string()),
            DashboardError::InvalidAggregate("no measures".to_string()),
        ] {
            assert_eq!(status_for(&error), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_aggregate_from_json_body() {
        let Json(response) = run_aggregate(Json(aggregate_request(json!({}))))
            .await
            .unwrap();
        let AggregateResponse::Rows { result, record_count } = response else {
            panic!("expected rows");
        };
        assert!(record_count > 0);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].group, vec!["North"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_column_is_rejected() {
        let request = aggregate_request(json!({"sort_by": "sum_tax"}));
        assert_eq!(
            run_aggregate(Json(request)).await.err(),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[tokio::test]
    async fn test_oversized_dataset_is_bad_request() {
        let request: RecordsRequest = serde_json::from_value(json!({
            "dataset": {
                "start_date": "1900-01-01",
                "end_date": "2100-12-31",
                "seed": 3,
                "variant": "transactions"
            }
        }))
        .unwrap();
        assert_eq!(
            get_records(Json(request)).await.err(),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[tokio::test]
    async fn test_blocking_task_panic_is_server_error() {
        let result: Result<(), StatusCode> =
            run_blocking("panic", || panic!("generator crashed")).await;
        assert_eq!(result.err(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_empty_dashboard_request_uses_defaults() {
        let request: DashboardRequest = serde_json::from_str("{}").unwrap();
        let Json(response) = get_dashboard(Json(request)).await.unwrap();
        assert!(matches!(response, DashboardResponse::Ready { .. }));
    }
}
