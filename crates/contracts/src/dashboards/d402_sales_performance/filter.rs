use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::record::Dimension;

/// Inclusive date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Per-dimension selections plus a date range.
///
/// A dimension missing from `selections` is not constrained; a dimension
/// present with an empty set excludes every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_range: DateRange,
    #[serde(default)]
    pub selections: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            selections: BTreeMap::new(),
        }
    }

    /// Replace the selection of one dimension
    pub fn with_selection<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(dimension, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.selections.get(&dimension)
    }
}

/// Selectable values for every dimension, sorted.
///
/// `quarters` and `sub_categories` are already narrowed by the year and
/// category selections they depend on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub quarters: Vec<String>,
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub salespersons: Vec<String>,
}

impl FilterOptions {
    pub fn get(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::Year => &self.years,
            Dimension::Quarter => &self.quarters,
            Dimension::Region => &self.regions,
            Dimension::Category => &self.categories,
            Dimension::SubCategory => &self.sub_categories,
            Dimension::Salesperson => &self.salespersons,
        }
    }
}
