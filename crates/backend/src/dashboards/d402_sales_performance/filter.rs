use contracts::dashboards::d402_sales_performance::{
    DateRange, Dimension, FilterOptions, FilterSpec, SalesRecord,
};
use std::collections::{BTreeMap, BTreeSet};

use super::generator::RecordSet;

/// Result of applying a filter. `Empty` is an expected outcome, not an error:
/// callers show a "no data" notice and skip aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Empty,
    Matched(RecordSet),
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::Empty)
    }

    pub fn records(&self) -> Option<&RecordSet> {
        match self {
            FilterOutcome::Empty => None,
            FilterOutcome::Matched(data) => Some(data),
        }
    }

    pub fn into_records(self) -> Option<RecordSet> {
        match self {
            FilterOutcome::Empty => None,
            FilterOutcome::Matched(data) => Some(data),
        }
    }
}

/// Records inside the date range whose value for every selected dimension is
/// a member of that dimension's selection
pub fn filter(data: &RecordSet, spec: &FilterSpec) -> FilterOutcome {
    let matched: RecordSet = data
        .iter()
        .filter(|r| matches_spec(r, spec))
        .cloned()
        .collect();

    tracing::debug!("D402: filter kept {} of {} records", matched.len(), data.len());

    if matched.is_empty() {
        FilterOutcome::Empty
    } else {
        FilterOutcome::Matched(matched)
    }
}

fn matches_spec(record: &SalesRecord, spec: &FilterSpec) -> bool {
    if !spec.date_range.contains(record.date) {
        return false;
    }
    spec.selections.iter().all(|(dimension, allowed)| {
        !allowed.is_empty()
            && record
                .dimension_value(*dimension)
                .is_some_and(|value| allowed.contains(value.as_ref()))
    })
}

/// Filter that selects every value present in `data` for every dimension it
/// carries, over `date_range`
pub fn full_domain(data: &RecordSet, date_range: DateRange) -> FilterSpec {
    let mut selections: BTreeMap<Dimension, BTreeSet<String>> = BTreeMap::new();
    for record in data.iter() {
        for dimension in Dimension::ALL {
            if let Some(value) = record.dimension_value(dimension) {
                selections
                    .entry(dimension)
                    .or_default()
                    .insert(value.into_owned());
            }
        }
    }
    FilterSpec {
        date_range,
        selections,
    }
}

/// Selectable options given the current selections.
///
/// Quarters are limited to the selected years and sub-categories to the
/// selected categories. A dimension without a selection counts as fully
/// selected.
pub fn filter_options(
    data: &RecordSet,
    selections: &BTreeMap<Dimension, BTreeSet<String>>,
) -> FilterOptions {
    let selected = |dimension: Dimension, record: &SalesRecord| match selections.get(&dimension) {
        None => true,
        Some(allowed) => record
            .dimension_value(dimension)
            .is_some_and(|value| allowed.contains(value.as_ref())),
    };

    let mut years = BTreeSet::new();
    let mut quarters = BTreeSet::new();
    let mut regions = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut sub_categories = BTreeSet::new();
    let mut salespersons = BTreeSet::new();

    for record in data.iter() {
        years.insert(record.year().to_string());
        regions.insert(record.region.clone());
        categories.insert(record.category.clone());
        if let Some(person) = &record.salesperson {
            salespersons.insert(person.clone());
        }
        if selected(Dimension::Year, record) {
            quarters.insert(record.quarter());
        }
        if selected(Dimension::Category, record) {
            if let Some(sub) = &record.sub_category {
                sub_categories.insert(sub.clone());
            }
        }
    }

    FilterOptions {
        years: years.into_iter().collect(),
        quarters: quarters.into_iter().collect(),
        regions: regions.into_iter().collect(),
        categories: categories.into_iter().collect(),
        sub_categories: sub_categories.into_iter().collect(),
        salespersons: salespersons.into_iter().collect(),
    }
}

/// Drop sub-category and quarter selections that are no longer reachable
/// from the selected categories and years
pub fn cascade(data: &RecordSet, mut spec: FilterSpec) -> FilterSpec {
    let options = filter_options(data, &spec.selections);
    for dimension in [Dimension::Quarter, Dimension::SubCategory] {
        if let Some(selection) = spec.selections.get_mut(&dimension) {
            let reachable = options.get(dimension);
            selection.retain(|value| reachable.contains(value));
        }
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d402_sales_performance::catalog::DimensionCatalog;
    use crate::dashboards::d402_sales_performance::generator::{generate, SalesDataGenerator};
    use chrono::NaiveDate;
    use contracts::dashboards::d402_sales_performance::GeneratorVariant;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn two_years() -> (RecordSet, DateRange) {
        let range = DateRange::new(date("2022-01-01"), date("2023-12-31"));
        (generate(range.from, range.to, 42).unwrap(), range)
    }

    #[test]
    fn test_full_domain_is_identity() {
        let (data, range) = two_years();
        let spec = full_domain(&data, range);
        assert_eq!(spec.selections.len(), 6);
        assert_eq!(filter(&data, &spec), FilterOutcome::Matched(data.clone()));
    }

    #[test]
    fn test_full_domain_for_monthly_variant_is_identity() {
        let generator =
            SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::MonthlyPeriods);
        let data = generator.generate(date("2022-01-01"), date("2022-06-30"), 5).unwrap();
        let spec = full_domain(&data, DateRange::new(date("2022-01-01"), date("2022-06-30")));
        assert!(spec.selection(Dimension::SubCategory).is_none());
        assert_eq!(filter(&data, &spec).records(), Some(&data));
    }

    #[test]
    fn test_empty_selection_excludes_everything() {
        let (data, range) = two_years();
        for dimension in Dimension::ALL {
            let spec = full_domain(&data, range).with_selection(dimension, Vec::<String>::new());
            assert!(filter(&data, &spec).is_empty(), "{:?}", dimension);
        }
    }

    #[test]
    fn test_conjunction_of_predicates() {
        let (data, range) = two_years();
        let spec = FilterSpec::new(DateRange::new(date("2023-04-01"), date("2023-06-30")))
            .with_selection(Dimension::Region, ["North", "West"])
            .with_selection(Dimension::Salesperson, ["Alice"]);
        let outcome = filter(&data, &spec);
        let kept = outcome.records().unwrap();

        let expected = data
            .iter()
            .filter(|r| {
                range.contains(r.date)
                    && r.date >= date("2023-04-01")
                    && r.date <= date("2023-06-30")
                    && (r.region == "North" || r.region == "West")
                    && r.salesperson.as_deref() == Some("Alice")
            })
            .count();
        assert_eq!(kept.len(), expected);
        assert!(kept.iter().all(|r| r.quarter() == "2023Q2"));
    }

    #[test]
    fn test_missing_dimension_value_does_not_match() {
        let generator =
            SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::MonthlyPeriods);
        let data = generator.generate(date("2022-01-01"), date("2022-03-31"), 5).unwrap();
        let spec = FilterSpec::new(DateRange::new(date("2022-01-01"), date("2022-03-31")))
            .with_selection(Dimension::SubCategory, ["Laptops"]);
        assert!(filter(&data, &spec).is_empty());
    }

    #[test]
    fn test_date_range_outside_data_is_empty() {
        let (data, _) = two_years();
        let spec = FilterSpec::new(DateRange::new(date("2025-01-01"), date("2025-12-31")));
        assert_eq!(filter(&data, &spec), FilterOutcome::Empty);
    }

    #[test]
    fn test_sub_category_options_follow_categories() {
        let (data, _) = two_years();
        let catalog = DimensionCatalog::default();
        let mut selections = BTreeMap::new();
        selections.insert(
            Dimension::Category,
            BTreeSet::from(["Apparel".to_string(), "Groceries".to_string()]),
        );

        let options = filter_options(&data, &selections);
        assert_eq!(options.sub_categories.len(), 6);
        for sub in &options.sub_categories {
            let owner = catalog.category_of(sub).unwrap();
            assert!(owner.name == "Apparel" || owner.name == "Groceries");
        }
        assert_eq!(options.categories.len(), 4);
        assert_eq!(options.years, vec!["2022".to_string(), "2023".to_string()]);
    }

    #[test]
    fn test_quarter_options_follow_years() {
        let (data, _) = two_years();
        let mut selections = BTreeMap::new();
        selections.insert(Dimension::Year, BTreeSet::from(["2023".to_string()]));
        let options = filter_options(&data, &selections);
        assert_eq!(options.quarters, vec!["2023Q1", "2023Q2", "2023Q3", "2023Q4"]);
    }

    #[test]
    fn test_cascade_drops_unreachable_selections() {
        let (data, range) = two_years();
        let spec = full_domain(&data, range)
            .with_selection(Dimension::Category, ["Electronics"])
            .with_selection(Dimension::Year, ["2022"]);

        let spec = cascade(&data, spec);
        assert_eq!(
            spec.selection(Dimension::SubCategory).unwrap(),
            &BTreeSet::from([
                "Accessories".to_string(),
                "Laptops".to_string(),
                "Smartphones".to_string()
            ])
        );
        assert!(spec
            .selection(Dimension::Quarter)
            .unwrap()
            .iter()
            .all(|q| q.starts_with("2022")));
    }
}
