use serde::{Deserialize, Serialize};

use super::record::{Column, Dimension, TimeBucket};
use crate::shared::pivot::{ColumnHeader, ColumnType};

/// One level of the group-by key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GroupKey {
    Dimension(Dimension),
    TimeBucket(TimeBucket),
}

impl GroupKey {
    pub fn id(&self) -> &'static str {
        match self {
            GroupKey::Dimension(d) => d.id(),
            GroupKey::TimeBucket(b) => b.id(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::Dimension(d) => d.label(),
            GroupKey::TimeBucket(b) => b.label(),
        }
    }
}

impl From<Dimension> for GroupKey {
    fn from(value: Dimension) -> Self {
        GroupKey::Dimension(value)
    }
}

impl From<TimeBucket> for GroupKey {
    fn from(value: TimeBucket) -> Self {
        GroupKey::TimeBucket(value)
    }
}

/// Reduction applied to a column within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    /// Arithmetic mean over the defined values only
    Mean,
    /// Number of records in the group
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Measure {
    pub column: Column,
    pub reducer: Reducer,
}

impl Measure {
    pub fn sum(column: Column) -> Self {
        Self {
            column,
            reducer: Reducer::Sum,
        }
    }

    pub fn mean(column: Column) -> Self {
        Self {
            column,
            reducer: Reducer::Mean,
        }
    }

    pub fn count() -> Self {
        Self {
            column: Column::Revenue,
            reducer: Reducer::Count,
        }
    }

    /// Output column id: `sum_revenue`, `mean_profit_margin_pct`, `count`
    pub fn id(&self) -> String {
        match self.reducer {
            Reducer::Sum => format!("sum_{}", self.column.id()),
            Reducer::Mean => format!("mean_{}", self.column.id()),
            Reducer::Count => "count".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self.reducer {
            Reducer::Sum => format!("Total {}", self.column.label()),
            Reducer::Mean => format!("Average {}", self.column.label()),
            Reducer::Count => "Records".to_string(),
        }
    }
}

/// Percentage computed from grouped sums (sum-then-divide)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioMetric {
    /// `(sum(revenue) / sum(target_revenue) - 1) * 100`
    RevenueVsTarget,
    /// `(sum(revenue) / sum(previous_year_revenue) - 1) * 100`
    YoyGrowth,
    /// `sum(profit) / sum(revenue) * 100`
    ProfitMargin,
}

impl RatioMetric {
    pub fn id(&self) -> &'static str {
        match self {
            RatioMetric::RevenueVsTarget => "revenue_vs_target_pct",
            RatioMetric::YoyGrowth => "yoy_growth_pct",
            RatioMetric::ProfitMargin => "profit_margin_pct",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatioMetric::RevenueVsTarget => "Vs Target (%)",
            RatioMetric::YoyGrowth => "YoY Growth (%)",
            RatioMetric::ProfitMargin => "Profit Margin (%)",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Keep only the first N rows after sorting
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Value column id to sort by
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default = "default_true")]
    pub sort_descending: bool,
    /// Drop groups where any value column is undefined
    #[serde(default)]
    pub drop_undefined: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: None,
            sort_by: None,
            sort_descending: true,
            drop_undefined: false,
        }
    }
}

/// Grouping key, reducers and presentation options for one view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateSpec {
    #[serde(default)]
    pub group_by: Vec<GroupKey>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub ratios: Vec<RatioMetric>,
    #[serde(default)]
    pub options: AggregateOptions,
}

impl AggregateSpec {
    pub fn by(key: impl Into<GroupKey>) -> Self {
        Self {
            group_by: vec![key.into()],
            ..Self::default()
        }
    }

    pub fn then_by(mut self, key: impl Into<GroupKey>) -> Self {
        self.group_by.push(key.into());
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    pub fn sum(self, column: Column) -> Self {
        self.measure(Measure::sum(column))
    }

    pub fn mean(self, column: Column) -> Self {
        self.measure(Measure::mean(column))
    }

    pub fn count(self) -> Self {
        self.measure(Measure::count())
    }

    pub fn ratio(mut self, ratio: RatioMetric) -> Self {
        self.ratios.push(ratio);
        self
    }

    pub fn sort_desc(mut self, column_id: impl Into<String>) -> Self {
        self.options.sort_by = Some(column_id.into());
        self.options.sort_descending = true;
        self
    }

    pub fn top(mut self, n: usize) -> Self {
        self.options.top_n = Some(n);
        self
    }

    pub fn drop_undefined(mut self) -> Self {
        self.options.drop_undefined = true;
        self
    }
}

/// One output row: group key values followed by value columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub group: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// Aggregation result. `columns` lists the grouping headers first, then the
/// value headers in the same order as `AggregateRow::values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRows {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a value column inside `AggregateRow::values`
    pub fn value_index(&self, column_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Aggregated)
            .position(|c| c.id == column_id)
    }

    pub fn value(&self, row: usize, column_id: &str) -> Option<f64> {
        let idx = self.value_index(column_id)?;
        self.rows.get(row)?.values.get(idx).copied().flatten()
    }

    /// Row whose group key equals `group`
    pub fn find(&self, group: &[&str]) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| {
            r.group.len() == group.len() && r.group.iter().zip(group).all(|(a, b)| a == b)
        })
    }
}
