use std::collections::{HashMap, HashSet};

use registry::ProductRecord;

pub const BASE_YEAR: i32 = 2024;
pub const TRACKED_YEAR: i32 = 2025;

/// Production counts for one product name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCounts {
    pub count_2024: u32,
    /// January first.
    pub monthly_2025: [u32; 12],
}

impl ProductCounts {
    pub fn total_2025(&self) -> u32 {
        self.monthly_2025.iter().sum()
    }
}

/// Per-name accumulator that survives across searches until reset.
#[derive(Debug, Default)]
pub struct Aggregation {
    products: HashMap<String, ProductCounts>,
}

impl Aggregation {
    /// Folds raw registry rows in. Returns how many rows were counted.
    pub fn fold(&mut self, records: &[ProductRecord]) -> usize {
        let mut counted = 0;

        for record in records {
            let (Some(name), Some(date)) = (record.name(), record.manufacture_date()) else {
                continue;
            };

            match (date.year, date.month) {
                (BASE_YEAR, _) => {
                    self.entry(name).count_2024 += 1;
                }
                (TRACKED_YEAR, Some(month @ 1..=12)) => {
                    self.entry(name).monthly_2025[month as usize - 1] += 1;
                }
                _ => continue,
            }

            counted += 1;
        }

        counted
    }

    fn entry(&mut self, name: &str) -> &mut ProductCounts {
        self.products.entry(name.to_string()).or_default()
    }

    pub fn get(&self, name: &str) -> Option<&ProductCounts> {
        self.products.get(name)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    /// Distinct names of `records`, busiest 2025 first.
    ///
    /// Only names present in this batch are ranked, even if older searches left
    /// other names in the map. Ties keep first-seen order.
    pub fn rank(&self, records: &[ProductRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names: Vec<String> = records
            .iter()
            .filter_map(ProductRecord::name)
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect();

        names.sort_by_key(|name| {
            std::cmp::Reverse(self.get(name).map_or(0, ProductCounts::total_2025))
        });

        names
    }
}
