use contracts::dashboards::d402_sales_performance::AggregateRows;
use contracts::shared::pivot::{CellValue, ColumnType, PivotRow};
use std::collections::{BTreeMap, HashMap};

/// Flat row keyed by column id
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Column values by column ID
    pub values: HashMap<String, CellValue>,
}

impl RawRow {
    /// Convert aggregation output into flat rows keyed by column id
    pub fn from_aggregate(result: &AggregateRows) -> Vec<RawRow> {
        let grouping: Vec<&str> = result
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Grouping)
            .map(|c| c.id.as_str())
            .collect();
        let aggregated: Vec<&str> = result
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Aggregated)
            .map(|c| c.id.as_str())
            .collect();

        result
            .rows
            .iter()
            .map(|row| {
                let mut values = HashMap::new();
                for (id, value) in grouping.iter().zip(&row.group) {
                    values.insert(id.to_string(), CellValue::Text(value.clone()));
                }
                for (id, value) in aggregated.iter().zip(&row.values) {
                    values.insert(id.to_string(), CellValue::from(*value));
                }
                RawRow { values }
            })
            .collect()
    }
}

/// Turns flat grouped rows into a pivot tree with subtotals per level
pub struct TreeBuilder {
    /// Grouping column IDs (in order)
    grouping_columns: Vec<String>,
    /// Aggregated column IDs
    aggregated_columns: Vec<String>,
}

impl TreeBuilder {
    pub fn new(grouping_columns: Vec<String>, aggregated_columns: Vec<String>) -> Self {
        Self {
            grouping_columns,
            aggregated_columns,
        }
    }

    /// Build a hierarchical pivot tree from flat rows
    pub fn build(&self, rows: &[RawRow]) -> Vec<PivotRow> {
        if rows.is_empty() {
            return vec![];
        }

        if self.grouping_columns.is_empty() {
            return rows
                .iter()
                .map(|row| PivotRow {
                    level: 0,
                    values: row.values.clone(),
                    is_total: false,
                    children: vec![],
                })
                .collect();
        }

        self.build_recursive(rows, 0)
    }

    fn build_recursive(&self, rows: &[RawRow], level: usize) -> Vec<PivotRow> {
        let grouping_col = &self.grouping_columns[level];

        // Groups sorted by key
        let mut groups: BTreeMap<String, Vec<RawRow>> = BTreeMap::new();
        for row in rows {
            let key = cell_string(&row.values, grouping_col);
            groups.entry(key).or_default().push(row.clone());
        }

        let is_leaf = level + 1 >= self.grouping_columns.len();

        groups
            .into_values()
            .map(|group_rows| {
                let mut values = HashMap::new();
                values.insert(
                    grouping_col.clone(),
                    group_rows[0]
                        .values
                        .get(grouping_col)
                        .cloned()
                        .unwrap_or(CellValue::Null),
                );
                for agg_col in &self.aggregated_columns {
                    values.insert(agg_col.clone(), subtotal(&group_rows, agg_col));
                }

                let children = if is_leaf {
                    vec![]
                } else {
                    self.build_recursive(&group_rows, level + 1)
                };

                PivotRow {
                    level,
                    values,
                    is_total: !is_leaf,
                    children,
                }
            })
            .collect()
    }

    /// Grand total row across all input rows, labelled in the first grouping column
    pub fn grand_total(&self, rows: &[RawRow], label: &str) -> PivotRow {
        let mut values = HashMap::new();
        if let Some(first) = self.grouping_columns.first() {
            values.insert(first.clone(), CellValue::Text(label.to_string()));
        }
        for agg_col in &self.aggregated_columns {
            values.insert(agg_col.clone(), subtotal(rows, agg_col));
        }
        PivotRow {
            level: 0,
            values,
            is_total: true,
            children: vec![],
        }
    }
}

/// Sum of the numeric cells of `column`, `Null` when none are numeric
fn subtotal(rows: &[RawRow], column: &str) -> CellValue {
    let mut defined = rows
        .iter()
        .filter_map(|row| row.values.get(column).and_then(CellValue::as_f64))
        .peekable();
    if defined.peek().is_none() {
        return CellValue::Null;
    }
    CellValue::Number(defined.sum())
}

fn cell_string(values: &HashMap<String, CellValue>, column: &str) -> String {
    match values.get(column) {
        Some(CellValue::Text(s)) => s.clone(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Null) | None => String::new(),
    }
}
