use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Which synthetic generator produced a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorVariant {
    /// Random number of transactions per day, dimensions sampled with replacement
    #[default]
    Transactions,
    /// One row per month for every (region, category) combination
    MonthlyPeriods,
}

impl fmt::Display for GeneratorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorVariant::Transactions => write!(f, "transactions"),
            GeneratorVariant::MonthlyPeriods => write!(f, "monthly_periods"),
        }
    }
}

/// One simulated sale (or one period x dimension row in the monthly variant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub region: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub salesperson: Option<String>,
    pub revenue: f64,
    pub units_sold: u32,
    pub target_revenue: f64,
    pub cogs: Option<f64>,
    pub profit: Option<f64>,
    /// Backward estimate of the same slot one year earlier, `None` in the first year
    pub previous_year_revenue: Option<f64>,
    pub revenue_vs_target_pct: Option<f64>,
    pub yoy_growth_pct: Option<f64>,
    pub profit_margin_pct: Option<f64>,
}

impl SalesRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Quarter label, e.g. `2022Q1`
    pub fn quarter(&self) -> String {
        format!("{}Q{}", self.date.year(), (self.date.month0() / 3) + 1)
    }

    /// Month label, e.g. `2022-01`
    pub fn year_month(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.date.month0() as usize]
    }

    /// Value of a categorical dimension, `None` when the variant does not carry it
    pub fn dimension_value(&self, dimension: Dimension) -> Option<Cow<'_, str>> {
        match dimension {
            Dimension::Year => Some(Cow::Owned(self.year().to_string())),
            Dimension::Quarter => Some(Cow::Owned(self.quarter())),
            Dimension::Region => Some(Cow::Borrowed(self.region.as_str())),
            Dimension::Category => Some(Cow::Borrowed(self.category.as_str())),
            Dimension::SubCategory => self.sub_category.as_deref().map(Cow::Borrowed),
            Dimension::Salesperson => self.salesperson.as_deref().map(Cow::Borrowed),
        }
    }

    pub fn time_bucket(&self, bucket: TimeBucket) -> String {
        match bucket {
            TimeBucket::Year => self.year().to_string(),
            TimeBucket::Quarter => self.quarter(),
            TimeBucket::Month => self.year_month(),
            TimeBucket::Day => self.date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn column_value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Revenue => Some(self.revenue),
            Column::UnitsSold => Some(self.units_sold as f64),
            Column::TargetRevenue => Some(self.target_revenue),
            Column::Cogs => self.cogs,
            Column::Profit => self.profit,
            Column::PreviousYearRevenue => self.previous_year_revenue,
            Column::RevenueVsTargetPct => self.revenue_vs_target_pct,
            Column::YoyGrowthPct => self.yoy_growth_pct,
            Column::ProfitMarginPct => self.profit_margin_pct,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Categorical axis used for filtering and grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Quarter,
    Region,
    Category,
    SubCategory,
    Salesperson,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Year,
        Dimension::Quarter,
        Dimension::Region,
        Dimension::Category,
        Dimension::SubCategory,
        Dimension::Salesperson,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Quarter => "quarter",
            Dimension::Region => "region",
            Dimension::Category => "category",
            Dimension::SubCategory => "sub_category",
            Dimension::Salesperson => "salesperson",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::Quarter => "Quarter",
            Dimension::Region => "Region",
            Dimension::Category => "Product Category",
            Dimension::SubCategory => "Sub-Category",
            Dimension::Salesperson => "Salesperson",
        }
    }
}

/// Calendar bucket derived from the record date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Year,
    Quarter,
    Month,
    Day,
}

impl TimeBucket {
    pub fn id(&self) -> &'static str {
        match self {
            TimeBucket::Year => "year",
            TimeBucket::Quarter => "quarter",
            TimeBucket::Month => "year_month",
            TimeBucket::Day => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Year => "Year",
            TimeBucket::Quarter => "Quarter",
            TimeBucket::Month => "Month",
            TimeBucket::Day => "Date",
        }
    }
}

/// Numeric fact of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Revenue,
    UnitsSold,
    TargetRevenue,
    Cogs,
    Profit,
    PreviousYearRevenue,
    RevenueVsTargetPct,
    YoyGrowthPct,
    ProfitMarginPct,
}

impl Column {
    pub fn id(&self) -> &'static str {
        match self {
            Column::Revenue => "revenue",
            Column::UnitsSold => "units_sold",
            Column::TargetRevenue => "target_revenue",
            Column::Cogs => "cogs",
            Column::Profit => "profit",
            Column::PreviousYearRevenue => "previous_year_revenue",
            Column::RevenueVsTargetPct => "revenue_vs_target_pct",
            Column::YoyGrowthPct => "yoy_growth_pct",
            Column::ProfitMarginPct => "profit_margin_pct",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Column::Revenue => "Revenue",
            Column::UnitsSold => "Units Sold",
            Column::TargetRevenue => "Target Revenue",
            Column::Cogs => "COGS",
            Column::Profit => "Profit",
            Column::PreviousYearRevenue => "Previous Year Revenue",
            Column::RevenueVsTargetPct => "Revenue vs Target (%)",
            Column::YoyGrowthPct => "YoY Revenue Growth (%)",
            Column::ProfitMarginPct => "Profit Margin (%)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            region: "North".to_string(),
            category: "Electronics".to_string(),
            sub_category: None,
            salesperson: Some("Alice".to_string()),
            revenue: 100.0,
            units_sold: 3,
            target_revenue: 90.0,
            cogs: None,
            profit: None,
            previous_year_revenue: None,
            revenue_vs_target_pct: None,
            yoy_growth_pct: None,
            profit_margin_pct: None,
        }
    }

    #[test]
    fn test_time_attributes() {
        let r = record("2023-08-15");
        assert_eq!(r.year(), 2023);
        assert_eq!(r.quarter(), "2023Q3");
        assert_eq!(r.year_month(), "2023-08");
        assert_eq!(r.month_name(), "August");
        assert_eq!(r.time_bucket(TimeBucket::Day), "2023-08-15");
    }

    #[test]
    fn test_dimension_values() {
        let r = record("2022-12-31");
        assert_eq!(r.dimension_value(Dimension::Quarter).as_deref(), Some("2022Q4"));
        assert_eq!(r.dimension_value(Dimension::Region).as_deref(), Some("North"));
        assert_eq!(r.dimension_value(Dimension::SubCategory), None);
        assert_eq!(r.column_value(Column::UnitsSold), Some(3.0));
        assert_eq!(r.column_value(Column::Profit), None);
    }

    #[test]
    fn test_dimension_serializes_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Dimension::SubCategory, vec!["Laptops".to_string()]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"sub_category":["Laptops"]}"#);
    }
}
