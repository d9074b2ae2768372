use contracts::dashboards::d402_sales_performance::DatasetParams;
use once_cell::sync::OnceCell;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::DimensionCatalog;
use super::error::{DashboardError, Result};
use super::generator::{generate_dataset, RecordSet};

/// Bounds on what requests may generate and what stays in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    /// Longest inclusive date span accepted for generation
    pub max_days: u32,
    /// Datasets kept before the least recently used one is dropped
    pub capacity: usize,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            max_days: 3660,
            capacity: 8,
        }
    }
}

impl CacheLimits {
    /// Reject spans longer than `max_days`. Reversed ranges are left to the generator.
    pub fn check_span(&self, params: &DatasetParams) -> Result<()> {
        let days = (params.end_date - params.start_date).num_days() + 1;
        if days > i64::from(self.max_days) {
            return Err(DashboardError::InvalidConfig(format!(
                "dataset {}..{} spans {} days, the limit is {}",
                params.start_date, params.end_date, days, self.max_days
            )));
        }
        Ok(())
    }
}

/// Memoized full datasets keyed by their generation parameters.
///
/// A dataset is a pure function of its key, so entries never go stale; they
/// are only dropped to stay within `capacity`.
pub struct DatasetCache {
    catalog: Arc<DimensionCatalog>,
    limits: CacheLimits,
    entries: HashMap<DatasetParams, Arc<RecordSet>>,
    // Least recently used first
    recency: VecDeque<DatasetParams>,
}

impl DatasetCache {
    pub fn new(catalog: DimensionCatalog, limits: CacheLimits) -> Self {
        Self {
            catalog: Arc::new(catalog),
            limits,
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, params: &DatasetParams) -> bool {
        self.entries.contains_key(params)
    }

    /// Cached dataset for `params`, marking it as most recently used
    pub fn lookup(&mut self, params: &DatasetParams) -> Option<Arc<RecordSet>> {
        let data = Arc::clone(self.entries.get(params)?);
        self.touch(params);
        tracing::debug!(
            "D402: dataset cache hit for {}..{} seed {}",
            params.start_date,
            params.end_date,
            params.seed
        );
        Some(data)
    }

    /// Store `data` under `params`, evicting the least recently used entries
    /// past capacity. An entry already present wins over `data`.
    pub fn insert(&mut self, params: DatasetParams, data: Arc<RecordSet>) -> Arc<RecordSet> {
        if let Some(existing) = self.entries.get(&params) {
            let existing = Arc::clone(existing);
            self.touch(&params);
            return existing;
        }

        while self.entries.len() >= self.limits.capacity.max(1) {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(
                "D402: evicted dataset {}..{} seed {}",
                oldest.start_date,
                oldest.end_date,
                oldest.seed
            );
        }

        self.entries.insert(params, Arc::clone(&data));
        self.recency.push_back(params);
        data
    }

    /// Cached dataset for `params`, generating (with derived metrics) on a miss
    pub fn get_or_generate(&mut self, params: &DatasetParams) -> Result<Arc<RecordSet>> {
        if let Some(data) = self.lookup(params) {
            return Ok(data);
        }
        self.limits.check_span(params)?;
        let data = generate(params, &self.catalog)?;
        Ok(self.insert(*params, data))
    }

    fn touch(&mut self, params: &DatasetParams) {
        if let Some(pos) = self.recency.iter().position(|p| p == params) {
            self.recency.remove(pos);
        }
        self.recency.push_back(*params);
    }
}

fn generate(params: &DatasetParams, catalog: &DimensionCatalog) -> Result<Arc<RecordSet>> {
    let data = Arc::new(generate_dataset(params, catalog)?);
    tracing::info!(
        "D402: generated dataset {}..{} seed {} ({}): {} records",
        params.start_date,
        params.end_date,
        params.seed,
        params.variant,
        data.len()
    );
    Ok(data)
}

static DATASET_CACHE: OnceCell<Mutex<DatasetCache>> = OnceCell::new();

/// Install the process-wide cache. Later calls keep the first catalog and limits.
pub fn initialize(catalog: DimensionCatalog, limits: CacheLimits) {
    if DATASET_CACHE
        .set(Mutex::new(DatasetCache::new(catalog, limits)))
        .is_err()
    {
        tracing::warn!("D402: dataset cache already initialized");
    }
}

fn lock_cache() -> MutexGuard<'static, DatasetCache> {
    DATASET_CACHE
        .get_or_init(|| {
            Mutex::new(DatasetCache::new(
                DimensionCatalog::default(),
                CacheLimits::default(),
            ))
        })
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Dataset for `params` from the process-wide cache.
///
/// Generation runs without the lock held, so a slow miss does not stall
/// requests for datasets already cached. Two concurrent misses on one key may
/// both generate; the first insert is kept.
pub fn get_dataset(params: &DatasetParams) -> Result<Arc<RecordSet>> {
    let catalog = {
        let mut cache = lock_cache();
        if let Some(data) = cache.lookup(params) {
            return Ok(data);
        }
        cache.limits.check_span(params)?;
        Arc::clone(&cache.catalog)
    };

    let data = generate(params, &catalog)?;
    Ok(lock_cache().insert(*params, data))
}
