use super::error::{DashboardError, Result};

/// A dimension value with its multiplicative revenue factor
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub factor: f64,
}

impl Member {
    pub fn new(name: &str, factor: f64) -> Self {
        Self {
            name: name.to_string(),
            factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDef {
    pub name: String,
    pub factor: f64,
    pub sub_categories: Vec<String>,
}

impl CategoryDef {
    pub fn new(name: &str, factor: f64, sub_categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            factor,
            sub_categories: sub_categories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fixed enumerations the generator samples from
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionCatalog {
    pub regions: Vec<Member>,
    pub categories: Vec<CategoryDef>,
    pub salespersons: Vec<String>,
}

impl Default for DimensionCatalog {
    fn default() -> Self {
        Self {
            regions: vec![
                Member::new("North", 1.0),
                Member::new("South", 0.9),
                Member::new("East", 1.1),
                Member::new("West", 0.95),
                Member::new("Central", 1.05),
            ],
            categories: vec![
                CategoryDef::new("Electronics", 1.3, &["Smartphones", "Laptops", "Accessories"]),
                CategoryDef::new(
                    "Apparel",
                    0.8,
                    &["Men's Clothing", "Women's Clothing", "Footwear"],
                ),
                CategoryDef::new("Home Goods", 1.0, &["Furniture", "Kitchenware", "Decor"]),
                CategoryDef::new(
                    "Groceries",
                    0.7,
                    &["Fresh Produce", "Pantry Staples", "Beverages"],
                ),
            ],
            salespersons: ["Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DimensionCatalog {
    /// Reject enumerations the generator cannot sample from.
    ///
    /// `require_people` is set for the transaction variant, which draws a
    /// sub-category and a salesperson for every sale.
    pub fn validate(&self, require_people: bool) -> Result<()> {
        if self.regions.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "region enumeration is empty".to_string(),
            ));
        }
        if self.categories.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "category enumeration is empty".to_string(),
            ));
        }
        for region in &self.regions {
            check_factor("region", &region.name, region.factor)?;
        }
        for category in &self.categories {
            check_factor("category", &category.name, category.factor)?;
            if require_people && category.sub_categories.is_empty() {
                return Err(DashboardError::InvalidConfig(format!(
                    "category '{}' has no sub-categories",
                    category.name
                )));
            }
        }
        if require_people && self.salespersons.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "salesperson enumeration is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Category owning the given sub-category
    pub fn category_of(&self, sub_category: &str) -> Option<&CategoryDef> {
        self.categories
            .iter()
            .find(|c| c.sub_categories.iter().any(|s| s == sub_category))
    }
}

fn check_factor(kind: &str, name: &str, factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(DashboardError::InvalidConfig(format!(
            "{} '{}' has non-positive factor {}",
            kind, name, factor
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = DimensionCatalog::default();
        assert!(catalog.validate(true).is_ok());
        assert_eq!(catalog.regions.len(), 5);
        assert_eq!(catalog.categories.len(), 4);
        assert_eq!(catalog.salespersons.len(), 8);
        assert_eq!(
            catalog.category_of("Laptops").map(|c| c.name.as_str()),
            Some("Electronics")
        );
    }

    #[test]
    fn test_empty_salespersons_only_matter_for_transactions() {
        let catalog = DimensionCatalog {
            salespersons: vec![],
            ..DimensionCatalog::default()
        };
        assert!(catalog.validate(false).is_ok());
        assert!(matches!(
            catalog.validate(true),
            Err(DashboardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_factor_rejected() {
        let mut catalog = DimensionCatalog::default();
        catalog.regions[0].factor = 0.0;
        assert!(catalog.validate(false).is_err());
    }
}
