//! Seeded synthetic sales generator.
//!
//! Every call owns its own `StdRng` seeded from the request, so identical
//! `(start, end, seed, variant)` inputs always produce identical records.

use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d402_sales_performance::{DatasetParams, GeneratorVariant, SalesRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use super::catalog::DimensionCatalog;
use super::error::{DashboardError, Result};
use super::metrics::derive_metrics;

/// Immutable, ordered collection of generated records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<SalesRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<SalesRecord> {
        self.records
    }
}

impl FromIterator<SalesRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = SalesRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Numeric knobs of one generator variant. Ranges are half-open `[low, high)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorProfile {
    /// Revenue growth per simulated year
    pub trend_rate: f64,
    /// Amplitude of the annual sine cycle
    pub seasonal_amplitude: f64,
    pub base_revenue: (f64, f64),
    pub noise: (f64, f64),
    /// Per-sale sub-category spread, `None` when the variant has no sub-categories
    pub sub_category_spread: Option<(f64, f64)>,
    pub unit_price: (f64, f64),
    pub target_share: (f64, f64),
    /// Cost of goods as a share of revenue, `None` when the variant has no cost data
    pub cost_share: Option<(f64, f64)>,
    pub previous_year_jitter: (f64, f64),
    /// Sales drawn per day, `None` for the period-based variant
    pub transactions_per_day: Option<(u32, u32)>,
}

impl GeneratorProfile {
    pub fn for_variant(variant: GeneratorVariant) -> Self {
        match variant {
            GeneratorVariant::Transactions => Self {
                trend_rate: 0.08,
                seasonal_amplitude: 0.15,
                base_revenue: (20.0, 300.0),
                noise: (0.9, 1.1),
                sub_category_spread: Some((0.8, 1.2)),
                unit_price: (10.0, 100.0),
                target_share: (0.85, 1.10),
                cost_share: Some((0.4, 0.7)),
                previous_year_jitter: (0.95, 1.05),
                transactions_per_day: Some((5, 25)),
            },
            GeneratorVariant::MonthlyPeriods => Self {
                trend_rate: 0.05,
                seasonal_amplitude: 0.20,
                base_revenue: (8_000.0, 12_000.0),
                noise: (0.9, 1.1),
                sub_category_spread: None,
                unit_price: (40.0, 120.0),
                target_share: (0.90, 1.15),
                cost_share: None,
                previous_year_jitter: (0.95, 1.05),
                transactions_per_day: None,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        let mut ranges = vec![
            ("base_revenue", self.base_revenue),
            ("noise", self.noise),
            ("unit_price", self.unit_price),
            ("target_share", self.target_share),
            ("previous_year_jitter", self.previous_year_jitter),
        ];
        if let Some(spread) = self.sub_category_spread {
            ranges.push(("sub_category_spread", spread));
        }
        if let Some(cost) = self.cost_share {
            ranges.push(("cost_share", cost));
        }
        for (name, (low, high)) in ranges {
            if !(low > 0.0 && low < high && high.is_finite()) {
                return Err(DashboardError::InvalidConfig(format!(
                    "range {} must satisfy 0 < low < high, got {}..{}",
                    name, low, high
                )));
            }
        }
        if let Some((min_tx, max_tx)) = self.transactions_per_day {
            if min_tx == 0 || min_tx >= max_tx {
                return Err(DashboardError::InvalidConfig(format!(
                    "transactions per day must satisfy 0 < min < max, got {}..{}",
                    min_tx, max_tx
                )));
            }
        }
        Ok(())
    }
}

/// Generator bound to a catalog and a variant profile
pub struct SalesDataGenerator {
    catalog: DimensionCatalog,
    variant: GeneratorVariant,
    profile: GeneratorProfile,
}

impl SalesDataGenerator {
    pub fn new(catalog: DimensionCatalog, variant: GeneratorVariant) -> Self {
        Self {
            catalog,
            variant,
            profile: GeneratorProfile::for_variant(variant),
        }
    }

    pub fn with_profile(mut self, profile: GeneratorProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Raw records without derived metrics
    pub fn generate(&self, start: NaiveDate, end: NaiveDate, seed: u64) -> Result<RecordSet> {
        if end < start {
            return Err(DashboardError::InvalidConfig(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        self.catalog
            .validate(self.variant == GeneratorVariant::Transactions)?;
        self.profile.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let records = match self.variant {
            GeneratorVariant::Transactions => {
                let per_day = self.profile.transactions_per_day.ok_or_else(|| {
                    DashboardError::InvalidConfig(
                        "transaction variant needs a transactions-per-day range".to_string(),
                    )
                })?;
                self.daily_transactions(&mut rng, start, end, per_day)
            }
            GeneratorVariant::MonthlyPeriods => self.monthly_periods(&mut rng, start, end)?,
        };

        tracing::debug!(
            "D402: generated {} {} records for {}..{} (seed {})",
            records.len(),
            self.variant,
            start,
            end,
            seed
        );

        Ok(RecordSet::new(records))
    }

    fn daily_transactions(
        &self,
        rng: &mut StdRng,
        start: NaiveDate,
        end: NaiveDate,
        (min_tx, max_tx): (u32, u32),
    ) -> Vec<SalesRecord> {
        let mut records = Vec::new();

        for date in start.iter_days().take_while(|d| *d <= end) {
            let count = rng.gen_range(min_tx..max_tx);
            for _ in 0..count {
                let region = &self.catalog.regions[rng.gen_range(0..self.catalog.regions.len())];
                let category =
                    &self.catalog.categories[rng.gen_range(0..self.catalog.categories.len())];
                let sub_category =
                    &category.sub_categories[rng.gen_range(0..category.sub_categories.len())];
                let salesperson =
                    &self.catalog.salespersons[rng.gen_range(0..self.catalog.salespersons.len())];

                let mut record =
                    self.simulate(rng, date, start, region.factor * category.factor);
                record.region = region.name.clone();
                record.category = category.name.clone();
                record.sub_category = Some(sub_category.clone());
                record.salesperson = Some(salesperson.clone());
                records.push(record);
            }
        }

        records
    }

    fn monthly_periods(
        &self,
        rng: &mut StdRng,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SalesRecord>> {
        let mut records = Vec::new();
        let (mut year, mut month) = (start.year(), start.month());

        while (year, month) <= (end.year(), end.month()) {
            let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                DashboardError::InvalidConfig(format!("invalid month {:04}-{:02}", year, month))
            })?;
            let date = first_day.max(start);

            for region in &self.catalog.regions {
                for category in &self.catalog.categories {
                    let mut record =
                        self.simulate(rng, date, start, region.factor * category.factor);
                    record.region = region.name.clone();
                    record.category = category.name.clone();
                    records.push(record);
                }
            }

            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }

        Ok(records)
    }

    /// Numeric facts of one record; dimension fields are filled by the caller
    fn simulate(
        &self,
        rng: &mut StdRng,
        date: NaiveDate,
        start: NaiveDate,
        dimension_factor: f64,
    ) -> SalesRecord {
        let p = &self.profile;

        let year_factor = 1.0 + (date.year() - start.year()) as f64 * p.trend_rate;
        let seasonality =
            1.0 + ((date.month() as f64 - 1.0) * (2.0 * PI / 12.0)).sin() * p.seasonal_amplitude;
        let base_revenue = draw(rng, p.base_revenue) * seasonality * year_factor;

        let spread = p.sub_category_spread.map(|r| draw(rng, r)).unwrap_or(1.0);
        let revenue = base_revenue * dimension_factor * spread * draw(rng, p.noise);
        let units_sold = ((revenue / draw(rng, p.unit_price)).floor() as u32).max(1);
        let target_revenue = revenue * draw(rng, p.target_share);

        let cogs = p.cost_share.map(|r| revenue * draw(rng, r));
        let profit = cogs.map(|c| revenue - c);

        // Backward estimate, not a lookup of the matching record a year earlier
        let previous_year_revenue = if date.year() > start.year() {
            Some(revenue / (year_factor * draw(rng, p.previous_year_jitter)))
        } else {
            None
        };

        SalesRecord {
            date,
            region: String::new(),
            category: String::new(),
            sub_category: None,
            salesperson: None,
            revenue,
            units_sold,
            target_revenue,
            cogs,
            profit,
            previous_year_revenue,
            revenue_vs_target_pct: None,
            yoy_growth_pct: None,
            profit_margin_pct: None,
        }
    }
}

fn draw(rng: &mut StdRng, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..high)
}

/// Raw transaction records for `[start, end]` with the default catalog
pub fn generate(start: NaiveDate, end: NaiveDate, seed: u64) -> Result<RecordSet> {
    SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::Transactions)
        .generate(start, end, seed)
}

/// Generate and derive metrics: the full immutable dataset for `params`
pub fn generate_dataset(params: &DatasetParams, catalog: &DimensionCatalog) -> Result<RecordSet> {
    let raw = SalesDataGenerator::new(catalog.clone(), params.variant).generate(
        params.start_date,
        params.end_date,
        params.seed,
    )?;
    Ok(derive_metrics(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(date("2022-01-01"), date("2022-03-31"), 42).unwrap();
        let b = generate(date("2022-01-01"), date("2022-03-31"), 42).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);

        let c = generate(date("2022-01-01"), date("2022-03-31"), 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_records_are_positive() {
        let data = generate(date("2022-01-01"), date("2023-12-31"), 7).unwrap();
        for r in data.iter() {
            assert!(r.revenue > 0.0);
            assert!(r.units_sold >= 1);
            assert!(r.target_revenue > 0.0);
            let cogs = r.cogs.unwrap();
            assert!(cogs > 0.0 && cogs < r.revenue);
            assert!((r.profit.unwrap() - (r.revenue - cogs)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_previous_year_revenue_only_after_first_year() {
        let data = generate(date("2022-06-01"), date("2024-02-29"), 3).unwrap();
        let mut seen_later_year = false;
        for r in data.iter() {
            if r.year() == 2022 {
                assert_eq!(r.previous_year_revenue, None);
            } else {
                seen_later_year = true;
                assert!(r.previous_year_revenue.unwrap() > 0.0);
            }
        }
        assert!(seen_later_year);
    }

    #[test]
    fn test_daily_transaction_counts() {
        let data = generate(date("2022-01-01"), date("2022-01-31"), 42).unwrap();
        for day in 1..=31 {
            let d = NaiveDate::from_ymd_opt(2022, 1, day).unwrap();
            let count = data.iter().filter(|r| r.date == d).count();
            assert!((5..25).contains(&count), "day {} has {} sales", d, count);
        }
        let catalog = DimensionCatalog::default();
        for r in data.iter() {
            let owner = catalog.category_of(r.sub_category.as_deref().unwrap()).unwrap();
            assert_eq!(owner.name, r.category);
            assert!(r.salesperson.is_some());
        }
    }

    #[test]
    fn test_single_day_range() {
        let data = generate(date("2022-05-05"), date("2022-05-05"), 1).unwrap();
        assert!(data.iter().all(|r| r.date == date("2022-05-05")));
        assert!(!data.is_empty());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let err = generate(date("2022-02-01"), date("2022-01-01"), 42).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let catalog = DimensionCatalog {
            regions: vec![],
            ..DimensionCatalog::default()
        };
        let result = SalesDataGenerator::new(catalog, GeneratorVariant::MonthlyPeriods).generate(
            date("2022-01-01"),
            date("2022-12-31"),
            42,
        );
        assert!(matches!(result, Err(DashboardError::InvalidConfig(_))));
    }

    #[test]
    fn test_monthly_variant_covers_every_combination() {
        let generator =
            SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::MonthlyPeriods);
        let data = generator
            .generate(date("2022-01-15"), date("2023-03-10"), 42)
            .unwrap();

        // 15 months x 5 regions x 4 categories
        assert_eq!(data.len(), 15 * 5 * 4);
        assert_eq!(data.records()[0].date, date("2022-01-15"));
        assert_eq!(data.records()[20].date, date("2022-02-01"));
        for r in data.iter() {
            assert!(r.sub_category.is_none());
            assert!(r.salesperson.is_none());
            assert!(r.cogs.is_none() && r.profit.is_none());
            assert!(r.revenue > 0.0 && r.units_sold >= 1 && r.target_revenue > 0.0);
            assert_eq!(r.previous_year_revenue.is_some(), r.year() > 2022);
        }
    }

    #[test]
    fn test_monthly_variant_is_deterministic() {
        let generator =
            SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::MonthlyPeriods);
        let a = generator.generate(date("2022-01-01"), date("2023-06-30"), 42).unwrap();
        let b = generator.generate(date("2022-01-01"), date("2023-06-30"), 42).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);

        let c = generator.generate(date("2022-01-01"), date("2023-06-30"), 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let mut profile = GeneratorProfile::for_variant(GeneratorVariant::Transactions);
        profile.target_share = (1.1, 0.85);
        let result = SalesDataGenerator::new(DimensionCatalog::default(), GeneratorVariant::Transactions)
            .with_profile(profile)
            .generate(date("2022-01-01"), date("2022-01-02"), 1);
        assert!(matches!(result, Err(DashboardError::InvalidConfig(_))));
    }

    #[test]
    fn test_generate_dataset_derives_metrics() {
        let params = DatasetParams {
            start_date: date("2022-01-01"),
            end_date: date("2022-01-10"),
            seed: 42,
            variant: GeneratorVariant::Transactions,
        };
        let data = generate_dataset(&params, &DimensionCatalog::default()).unwrap();
        assert!(data.iter().all(|r| r.revenue_vs_target_pct.is_some()));
        assert!(data.iter().all(|r| r.profit_margin_pct.is_some()));
        assert!(data.iter().all(|r| r.yoy_growth_pct.is_none()));
    }
}
