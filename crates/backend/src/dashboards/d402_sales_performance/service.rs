//! Dashboard views. Every view is a `filter` followed by one or more
//! `aggregate` calls; nothing here reduces records on its own.

use chrono::NaiveDate;
use contracts::dashboards::d402_sales_performance::{
    AggregateRequest, AggregateResponse, AggregateRows, AggregateSpec, Column, DashboardRequest,
    DashboardResponse, DatasetParams, DateRange, DetailTable, Dimension, FilterOptions,
    FilterOptionsRequest, FilterSpec, GeneratorVariant, Measure, OverviewView, ProductView,
    RatioMetric, RecordsRequest, RegionalView, SalesDashboard, SalesRecord, SalespersonView,
    TimeBucket,
};
use contracts::shared::indicators::{IndicatorId, IndicatorStatus, IndicatorValue, ValueFormat};
use contracts::shared::pivot::PivotRow;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::aggregate::aggregate;
use super::cache;
use super::error::{DashboardError, Result};
use super::filter::{cascade, filter, filter_options, full_domain, FilterOutcome};
use super::generator::RecordSet;
use crate::shared::config::{Config, DashboardConfig};
use crate::shared::format::{format_money, format_number, format_percent, format_text};
use crate::shared::pivot::{RawRow, TreeBuilder};

pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Please adjust your selections.";

/// Defaults applied to requests that leave parts out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub default_dataset: DatasetParams,
    pub limits: DashboardConfig,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_dataset: config.generator.dataset_params(),
            limits: config.dashboard,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
        Self {
            default_dataset: DatasetParams {
                start_date: date(2022, 1, 1),
                end_date: date(2023, 12, 31),
                seed: 42,
                variant: GeneratorVariant::Transactions,
            },
            limits: DashboardConfig::default(),
        }
    }
}

static SETTINGS: OnceCell<ServiceSettings> = OnceCell::new();

pub fn initialize(settings: ServiceSettings) {
    if SETTINGS.set(settings).is_err() {
        tracing::warn!("D402: service settings already initialized");
    }
}

fn settings() -> &'static ServiceSettings {
    SETTINGS.get_or_init(ServiceSettings::default)
}

// ---------------------------------------------------------------------------
// Request entry points
// ---------------------------------------------------------------------------

struct Resolved {
    data: Arc<RecordSet>,
    spec: FilterSpec,
}

fn resolve(dataset: Option<DatasetParams>, filter: Option<FilterSpec>) -> Result<Resolved> {
    let params = dataset.unwrap_or(settings().default_dataset);
    let data = cache::get_dataset(&params)?;
    let spec = resolve_filter(&data, &params, filter)?;
    Ok(Resolved { data, spec })
}

/// Explicit filters are cascaded; a missing filter selects the whole dataset
pub fn resolve_filter(
    data: &RecordSet,
    params: &DatasetParams,
    filter: Option<FilterSpec>,
) -> Result<FilterSpec> {
    match filter {
        Some(spec) => {
            if spec.date_range.to < spec.date_range.from {
                return Err(DashboardError::InvalidConfig(format!(
                    "filter date range ends ({}) before it starts ({})",
                    spec.date_range.to, spec.date_range.from
                )));
            }
            Ok(cascade(data, spec))
        }
        None => Ok(full_domain(
            data,
            DateRange::new(params.start_date, params.end_date),
        )),
    }
}

pub fn get_filter_options(request: FilterOptionsRequest) -> Result<FilterOptions> {
    let params = request.dataset.unwrap_or(settings().default_dataset);
    let data = cache::get_dataset(&params)?;
    Ok(filter_options(&data, &request.selections))
}

pub fn get_dashboard(request: DashboardRequest) -> Result<DashboardResponse> {
    let resolved = resolve(request.dataset, request.filter)?;
    dashboard_for(&resolved.data, &resolved.spec, &settings().limits)
}

pub fn run_aggregate(request: AggregateRequest) -> Result<AggregateResponse> {
    let resolved = resolve(request.dataset, request.filter)?;
    match filter(&resolved.data, &resolved.spec) {
        FilterOutcome::Empty => Ok(AggregateResponse::NoData {
            notice: NO_DATA_NOTICE.to_string(),
        }),
        FilterOutcome::Matched(records) => Ok(AggregateResponse::Rows {
            record_count: records.len(),
            result: aggregate(&records, &request.spec)?,
        }),
    }
}

pub fn get_records(request: RecordsRequest) -> Result<DetailTable> {
    let limit = request
        .limit
        .unwrap_or(settings().limits.detail_row_limit);
    let resolved = resolve(request.dataset, request.filter)?;
    let records = filter(&resolved.data, &resolved.spec)
        .into_records()
        .unwrap_or_default();
    Ok(detail_table(&records, limit))
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Filter `data` and build every tab, or a notice when nothing matches
pub fn dashboard_for(
    data: &RecordSet,
    spec: &FilterSpec,
    limits: &DashboardConfig,
) -> Result<DashboardResponse> {
    let records = match filter(data, spec) {
        FilterOutcome::Empty => {
            tracing::info!("D402: filter matched no records");
            return Ok(DashboardResponse::NoData {
                notice: NO_DATA_NOTICE.to_string(),
            });
        }
        FilterOutcome::Matched(records) => records,
    };

    let dashboard = SalesDashboard {
        record_count: records.len(),
        overview: overview(&records)?,
        regional: regional(&records)?,
        product: product(&records, limits)?,
        salesperson: salesperson(&records, limits)?,
        detail: detail_table(&records, limits.detail_row_limit),
    };
    Ok(DashboardResponse::Ready {
        dashboard: Box::new(dashboard),
    })
}

pub fn overview(data: &RecordSet) -> Result<OverviewView> {
    Ok(OverviewView {
        kpis: kpis(data)?,
        monthly_trend: aggregate(
            data,
            &AggregateSpec::by(TimeBucket::Month)
                .sum(Column::Revenue)
                .sum(Column::Profit)
                .sum(Column::TargetRevenue),
        )?,
        region_share: ranked(data, Dimension::Region, Column::Revenue, None)?,
        hierarchy: revenue_hierarchy(data)?,
    })
}

pub fn regional(data: &RecordSet) -> Result<RegionalView> {
    Ok(RegionalView {
        revenue_by_region: ranked(data, Dimension::Region, Column::Revenue, None)?,
        profit_by_region: ranked(data, Dimension::Region, Column::Profit, None)?,
        yoy_growth_by_region: ranked_ratio(data, Dimension::Region, RatioMetric::YoyGrowth)?,
        vs_target_by_region: ranked_ratio(data, Dimension::Region, RatioMetric::RevenueVsTarget)?,
    })
}

pub fn product(data: &RecordSet, limits: &DashboardConfig) -> Result<ProductView> {
    let top = Some(limits.top_subcategories);
    Ok(ProductView {
        revenue_by_category: ranked(data, Dimension::Category, Column::Revenue, None)?,
        profit_by_category: ranked(data, Dimension::Category, Column::Profit, None)?,
        top_sub_categories_by_revenue: ranked(data, Dimension::SubCategory, Column::Revenue, top)?,
        top_sub_categories_by_profit: ranked(data, Dimension::SubCategory, Column::Profit, top)?,
        portfolio: aggregate(
            data,
            &AggregateSpec::by(Dimension::SubCategory)
                .sum(Column::UnitsSold)
                .mean(Column::ProfitMarginPct)
                .sum(Column::Revenue)
                .drop_undefined(),
        )?,
    })
}

pub fn salesperson(data: &RecordSet, limits: &DashboardConfig) -> Result<SalespersonView> {
    let top = Some(limits.top_salespersons);
    Ok(SalespersonView {
        top_by_revenue: ranked(data, Dimension::Salesperson, Column::Revenue, top)?,
        top_by_profit: ranked(data, Dimension::Salesperson, Column::Profit, top)?,
        deal_stats: aggregate(
            data,
            &AggregateSpec::by(Dimension::Salesperson)
                .mean(Column::Revenue)
                .mean(Column::ProfitMarginPct)
                .count()
                .drop_undefined(),
        )?,
    })
}

/// Sum of `column` per value of `dimension`, largest first
fn ranked(
    data: &RecordSet,
    dimension: Dimension,
    column: Column,
    top: Option<usize>,
) -> Result<AggregateRows> {
    let measure = Measure::sum(column);
    let mut spec = AggregateSpec::by(dimension)
        .measure(measure)
        .sort_desc(measure.id());
    spec.options.top_n = top;
    aggregate(data, &spec)
}

fn ranked_ratio(data: &RecordSet, dimension: Dimension, ratio: RatioMetric) -> Result<AggregateRows> {
    aggregate(
        data,
        &AggregateSpec::by(dimension)
            .ratio(ratio)
            .sort_desc(ratio.id())
            .drop_undefined(),
    )
}

/// Category -> sub-category revenue tree followed by a grand total row
fn revenue_hierarchy(data: &RecordSet) -> Result<Vec<PivotRow>> {
    let flat = aggregate(
        data,
        &AggregateSpec::by(Dimension::Category)
            .then_by(Dimension::SubCategory)
            .sum(Column::Revenue),
    )?;
    let rows = RawRow::from_aggregate(&flat);
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let builder = TreeBuilder::new(
        vec![
            Dimension::Category.id().to_string(),
            Dimension::SubCategory.id().to_string(),
        ],
        vec![Measure::sum(Column::Revenue).id()],
    );
    let mut tree = builder.build(&rows);
    tree.push(builder.grand_total(&rows, "Total"));
    Ok(tree)
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

pub fn kpis(data: &RecordSet) -> Result<Vec<IndicatorValue>> {
    let totals = aggregate(
        data,
        &AggregateSpec::default()
            .sum(Column::Revenue)
            .sum(Column::PreviousYearRevenue)
            .sum(Column::Profit)
            .sum(Column::TargetRevenue)
            .mean(Column::ProfitMarginPct)
            .sum(Column::UnitsSold)
            .count()
            .ratio(RatioMetric::YoyGrowth)
            .ratio(RatioMetric::RevenueVsTarget),
    )?;
    let total = |id: &str| totals.value(0, id);

    let yoy = total("yoy_growth_pct");
    let vs_target = total("revenue_vs_target_pct");
    let money = || ValueFormat::Money {
        currency: "USD".to_string(),
    };

    Ok(vec![
        IndicatorValue {
            previous_value: total("sum_previous_year_revenue"),
            change_percent: yoy,
            status: status_by_sign(yoy),
            subtitle: Some(match yoy {
                Some(_) => "vs. previous year".to_string(),
                None => "no previous-year data".to_string(),
            }),
            ..indicator("total_revenue", "Total Revenue", money(), total("sum_revenue"))
        },
        indicator("total_profit", "Total Profit", money(), total("sum_profit")),
        indicator(
            "avg_profit_margin",
            "Avg. Profit Margin",
            ValueFormat::Percent { decimals: 1 },
            total("mean_profit_margin_pct"),
        ),
        IndicatorValue {
            status: status_by_sign(vs_target),
            subtitle: Some(format!(
                "Target: {}",
                format_money(total("sum_target_revenue"))
            )),
            ..indicator(
                "revenue_vs_target",
                "Revenue vs Target",
                ValueFormat::Percent { decimals: 1 },
                vs_target,
            )
        },
        indicator(
            "units_sold",
            "Units Sold",
            ValueFormat::Integer,
            total("sum_units_sold"),
        ),
        indicator(
            "record_count",
            "Transactions",
            ValueFormat::Integer,
            total("count"),
        ),
    ])
}

fn indicator(id: &str, label: &str, format: ValueFormat, value: Option<f64>) -> IndicatorValue {
    IndicatorValue {
        id: IndicatorId::new(id),
        label: label.to_string(),
        format,
        value,
        previous_value: None,
        change_percent: None,
        status: IndicatorStatus::Neutral,
        subtitle: None,
    }
}

fn status_by_sign(change: Option<f64>) -> IndicatorStatus {
    match change {
        Some(c) if c >= 0.0 => IndicatorStatus::Good,
        Some(_) => IndicatorStatus::Bad,
        None => IndicatorStatus::Neutral,
    }
}

// ---------------------------------------------------------------------------
// Detail table
// ---------------------------------------------------------------------------

const DETAIL_COLUMNS: [Column; 9] = [
    Column::Revenue,
    Column::UnitsSold,
    Column::TargetRevenue,
    Column::Cogs,
    Column::Profit,
    Column::PreviousYearRevenue,
    Column::RevenueVsTargetPct,
    Column::YoyGrowthPct,
    Column::ProfitMarginPct,
];

/// First `limit` records formatted for display
pub fn detail_table(data: &RecordSet, limit: usize) -> DetailTable {
    let mut columns: Vec<String> = vec![
        "Date".to_string(),
        "Year".to_string(),
        "Quarter".to_string(),
    ];
    columns.extend(
        [
            Dimension::Region,
            Dimension::Category,
            Dimension::SubCategory,
            Dimension::Salesperson,
        ]
        .iter()
        .map(|d| d.label().to_string()),
    );
    columns.extend(DETAIL_COLUMNS.iter().map(|c| c.label().to_string()));

    let rows = data.iter().take(limit).map(detail_row).collect();

    DetailTable {
        columns,
        rows,
        total_rows: data.len(),
        truncated: data.len() > limit,
    }
}

fn detail_row(record: &SalesRecord) -> Vec<String> {
    let mut row = vec![
        record.date.format("%Y-%m-%d").to_string(),
        record.year().to_string(),
        record.quarter(),
        record.region.clone(),
        record.category.clone(),
        format_text(record.sub_category.as_deref()),
        format_text(record.salesperson.as_deref()),
    ];
    row.extend(DETAIL_COLUMNS.iter().map(|&column| {
        let value = record.column_value(column);
        match column {
            Column::UnitsSold => format_number(u64::from(record.units_sold)),
            Column::RevenueVsTargetPct | Column::YoyGrowthPct | Column::ProfitMarginPct => {
                format_percent(value)
            }
            _ => format_money(value),
        }
    }));
    row
}
