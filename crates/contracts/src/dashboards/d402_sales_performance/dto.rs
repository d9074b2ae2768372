use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::{AggregateRows, AggregateSpec};
use super::filter::FilterSpec;
use super::record::{Dimension, GeneratorVariant};
use crate::shared::indicators::IndicatorValue;
use crate::shared::pivot::PivotRow;

/// Parameters that fully determine a generated dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetParams {
    /// Start date in format "YYYY-MM-DD"
    pub start_date: NaiveDate,
    /// End date in format "YYYY-MM-DD"
    pub end_date: NaiveDate,
    pub seed: u64,
    #[serde(default)]
    pub variant: GeneratorVariant,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request for the cascaded filter options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptionsRequest {
    /// Dataset to read options from; server defaults when omitted
    #[serde(default)]
    pub dataset: Option<DatasetParams>,
    /// Current selections; missing dimensions count as fully selected
    #[serde(default)]
    pub selections: BTreeMap<Dimension, BTreeSet<String>>,
}

/// Request for the full dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    pub dataset: Option<DatasetParams>,
    /// Filter to apply; everything selected when omitted
    #[serde(default)]
    pub filter: Option<FilterSpec>,
}

/// Request for an ad-hoc aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRequest {
    #[serde(default)]
    pub dataset: Option<DatasetParams>,
    #[serde(default)]
    pub filter: Option<FilterSpec>,
    pub spec: AggregateSpec,
}

/// Request for the detailed record table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsRequest {
    #[serde(default)]
    pub dataset: Option<DatasetParams>,
    #[serde(default)]
    pub filter: Option<FilterSpec>,
    /// Maximum number of rows, server default when omitted
    #[serde(default)]
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response for an ad-hoc aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateResponse {
    /// The filter matched nothing; aggregation was skipped
    NoData { notice: String },
    Rows {
        record_count: usize,
        result: AggregateRows,
    },
}

/// Response for the full dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardResponse {
    NoData { notice: String },
    Ready { dashboard: Box<SalesDashboard> },
}

/// All tabs of the sales performance dashboard for one filter selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesDashboard {
    /// Number of records after filtering
    pub record_count: usize,
    pub overview: OverviewView,
    pub regional: RegionalView,
    pub product: ProductView,
    pub salesperson: SalespersonView,
    pub detail: DetailTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewView {
    pub kpis: Vec<IndicatorValue>,
    /// Revenue, profit and target per calendar month
    pub monthly_trend: AggregateRows,
    /// Revenue contribution by region
    pub region_share: AggregateRows,
    /// Category -> sub-category revenue tree
    pub hierarchy: Vec<PivotRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionalView {
    pub revenue_by_region: AggregateRows,
    pub profit_by_region: AggregateRows,
    pub yoy_growth_by_region: AggregateRows,
    pub vs_target_by_region: AggregateRows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub revenue_by_category: AggregateRows,
    pub profit_by_category: AggregateRows,
    pub top_sub_categories_by_revenue: AggregateRows,
    pub top_sub_categories_by_profit: AggregateRows,
    /// Units sold vs. average margin per sub-category
    pub portfolio: AggregateRows,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonView {
    pub top_by_revenue: AggregateRows,
    pub top_by_profit: AggregateRows,
    /// Average deal size, average margin and deal count
    pub deal_stats: AggregateRows,
}

/// Formatted slice of the filtered records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Number of filtered records before truncation
    pub total_rows: usize,
    pub truncated: bool,
}
