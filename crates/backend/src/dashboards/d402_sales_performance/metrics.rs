use contracts::dashboards::d402_sales_performance::SalesRecord;

use super::generator::RecordSet;

/// Fill the three percentage fields of every record.
///
/// Zero or missing denominators and non-finite results become `None`.
pub fn derive_metrics(data: RecordSet) -> RecordSet {
    data.into_records()
        .into_iter()
        .map(with_metrics)
        .collect()
}

fn with_metrics(mut record: SalesRecord) -> SalesRecord {
    record.revenue_vs_target_pct = growth_pct(Some(record.revenue), Some(record.target_revenue));
    record.yoy_growth_pct = growth_pct(Some(record.revenue), record.previous_year_revenue);
    record.profit_margin_pct = share_pct(record.profit, Some(record.revenue));
    record
}

/// `numerator / denominator`, or `None` when the quotient is undefined
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let q = n / d;
    q.is_finite().then_some(q)
}

/// `(numerator / denominator - 1) * 100`
pub fn growth_pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator, denominator).map(|r| (r - 1.0) * 100.0)
}

/// `numerator / denominator * 100`
pub fn share_pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(revenue: f64, target: f64, profit: Option<f64>, prev: Option<f64>) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            region: "East".to_string(),
            category: "Apparel".to_string(),
            sub_category: Some("Footwear".to_string()),
            salesperson: Some("Eve".to_string()),
            revenue,
            units_sold: 1,
            target_revenue: target,
            cogs: profit.map(|p| revenue - p),
            profit,
            previous_year_revenue: prev,
            revenue_vs_target_pct: None,
            yoy_growth_pct: None,
            profit_margin_pct: None,
        }
    }

    #[test]
    fn test_percentages() {
        let data = derive_metrics(RecordSet::new(vec![record(
            120.0,
            100.0,
            Some(30.0),
            Some(80.0),
        )]));
        let r = &data.records()[0];
        assert!((r.revenue_vs_target_pct.unwrap() - 20.0).abs() < 1e-9);
        assert!((r.yoy_growth_pct.unwrap() - 50.0).abs() < 1e-9);
        assert!((r.profit_margin_pct.unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_denominators_become_missing() {
        let data = derive_metrics(RecordSet::new(vec![
            record(100.0, 0.0, None, None),
            record(0.0, 50.0, Some(0.0), Some(0.0)),
            record(f64::INFINITY, 1.0, Some(1.0), Some(1.0)),
        ]));
        let rs = data.records();

        assert_eq!(rs[0].revenue_vs_target_pct, None);
        assert_eq!(rs[0].yoy_growth_pct, None);
        assert_eq!(rs[0].profit_margin_pct, None);

        assert_eq!(rs[1].yoy_growth_pct, None);
        assert_eq!(rs[1].profit_margin_pct, None);
        assert!((rs[1].revenue_vs_target_pct.unwrap() + 100.0).abs() < 1e-9);

        assert_eq!(rs[2].revenue_vs_target_pct, None);
        assert_eq!(rs[2].yoy_growth_pct, None);
    }

    #[test]
    fn test_ratio_helpers() {
        assert_eq!(ratio(Some(1.0), None), None);
        assert_eq!(ratio(Some(0.0), Some(0.0)), None);
        assert_eq!(share_pct(Some(1.0), Some(4.0)), Some(25.0));
        assert_eq!(growth_pct(Some(110.0), Some(100.0)).map(|g| g.round()), Some(10.0));
    }
}
