//! Group-and-reduce over a filtered record set.
//!
//! Groups are emitted in first-appearance order of their key in the input,
//! which for generated data is generation order. Sorting is stable, so ties
//! keep that order.

use contracts::dashboards::d402_sales_performance::{
    AggregateRow, AggregateRows, AggregateSpec, Column, GroupKey, Measure, RatioMetric, Reducer,
    SalesRecord,
};
use contracts::shared::pivot::ColumnHeader;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::error::{DashboardError, Result};
use super::generator::RecordSet;
use super::metrics::{growth_pct, share_pct};

struct Group<'a> {
    key: Vec<String>,
    members: Vec<&'a SalesRecord>,
}

pub fn aggregate(data: &RecordSet, spec: &AggregateSpec) -> Result<AggregateRows> {
    if spec.measures.is_empty() && spec.ratios.is_empty() {
        return Err(DashboardError::InvalidAggregate(
            "at least one measure or ratio is required".to_string(),
        ));
    }

    let columns = build_columns(spec);
    let value_ids: Vec<&str> = columns
        .iter()
        .skip(spec.group_by.len())
        .map(|c| c.id.as_str())
        .collect();

    let sort_index = match &spec.options.sort_by {
        Some(id) => Some(
            value_ids
                .iter()
                .position(|v| *v == id.as_str())
                .ok_or_else(|| DashboardError::UnknownColumn(id.clone()))?,
        ),
        None if spec.options.top_n.is_some() => Some(0),
        None => None,
    };

    let mut rows: Vec<AggregateRow> = group_records(data, &spec.group_by)
        .into_iter()
        .map(|group| {
            let mut values: Vec<Option<f64>> = spec
                .measures
                .iter()
                .map(|m| reduce(&group.members, m))
                .collect();
            values.extend(spec.ratios.iter().map(|r| ratio_value(&group.members, *r)));
            AggregateRow {
                group: group.key,
                values,
            }
        })
        .collect();

    if spec.options.drop_undefined {
        rows.retain(|row| row.values.iter().all(Option::is_some));
    }

    if let Some(idx) = sort_index {
        let descending = spec.options.sort_descending;
        rows.sort_by(|a, b| compare_missing_last(a.values[idx], b.values[idx], descending));
    }

    if let Some(n) = spec.options.top_n {
        rows.truncate(n);
    }

    Ok(AggregateRows { columns, rows })
}

fn build_columns(spec: &AggregateSpec) -> Vec<ColumnHeader> {
    let mut columns: Vec<ColumnHeader> = spec
        .group_by
        .iter()
        .map(|k| ColumnHeader::grouping(k.id(), k.label()))
        .collect();
    columns.extend(
        spec.measures
            .iter()
            .map(|m| ColumnHeader::aggregated(m.id(), m.label())),
    );
    columns.extend(
        spec.ratios
            .iter()
            .map(|r| ColumnHeader::aggregated(r.id(), r.label())),
    );
    columns
}

fn group_records<'a>(data: &'a RecordSet, keys: &[GroupKey]) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for record in data.iter() {
        // Records without a value for a grouping dimension are left out
        let Some(key) = keys
            .iter()
            .map(|k| key_value(record, *k))
            .collect::<Option<Vec<String>>>()
        else {
            continue;
        };

        match index.get(&key) {
            Some(&i) => groups[i].members.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    members: vec![record],
                });
            }
        }
    }

    groups
}

fn key_value(record: &SalesRecord, key: GroupKey) -> Option<String> {
    match key {
        GroupKey::Dimension(d) => record.dimension_value(d).map(|v| v.into_owned()),
        GroupKey::TimeBucket(b) => Some(record.time_bucket(b)),
    }
}

fn reduce(members: &[&SalesRecord], measure: &Measure) -> Option<f64> {
    match measure.reducer {
        Reducer::Sum => sum_defined(members, measure.column),
        Reducer::Mean => {
            let defined: Vec<f64> = members
                .iter()
                .filter_map(|r| r.column_value(measure.column))
                .collect();
            if defined.is_empty() {
                None
            } else {
                Some(defined.iter().sum::<f64>() / defined.len() as f64)
            }
        }
        Reducer::Count => Some(members.len() as f64),
    }
}

/// Sum of the defined values, `None` when the group has none
fn sum_defined(members: &[&SalesRecord], column: Column) -> Option<f64> {
    members
        .iter()
        .filter_map(|r| r.column_value(column))
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Ratio of grouped sums, never the mean of per-record percentages
fn ratio_value(members: &[&SalesRecord], ratio: RatioMetric) -> Option<f64> {
    let revenue = sum_defined(members, Column::Revenue);
    match ratio {
        RatioMetric::RevenueVsTarget => {
            growth_pct(revenue, sum_defined(members, Column::TargetRevenue))
        }
        RatioMetric::YoyGrowth => {
            growth_pct(revenue, sum_defined(members, Column::PreviousYearRevenue))
        }
        RatioMetric::ProfitMargin => share_pct(sum_defined(members, Column::Profit), revenue),
    }
}

fn compare_missing_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
