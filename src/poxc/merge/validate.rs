use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument};

use crate::poxc::merge::keys::KeyTable;
use crate::poxc::merge::model::{CompositeKey, Dataset};

/// A (plot, depth) pair seen more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: CompositeKey,
    pub occurrences: usize,
}

/// Advisory findings about how the merged rows cover the key table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Key-table pairs without a single merged row, in key-table order.
    pub missing_keys: Vec<CompositeKey>,
    /// Pairs repeated among the merged rows, in order of first appearance.
    pub duplicate_keys: Vec<DuplicateKey>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.missing_keys.is_empty() && self.duplicate_keys.is_empty()
    }
}

/// Compares the merged rows with the key table. The result is informational
/// only and never blocks the output.
#[instrument(
    level = "info",
    skip_all,
    fields(rows = dataset.len(), keys = keys.len())
)]
pub fn validate(dataset: &Dataset, keys: &KeyTable) -> ValidationReport {
    let found: HashSet<&CompositeKey> = dataset.keys().collect();

    let mut reported = HashSet::new();
    let missing_keys: Vec<CompositeKey> = keys
        .keys()
        .filter(|key| !found.contains(key) && reported.insert(*key))
        .cloned()
        .collect();

    let duplicate_keys = find_duplicates(dataset.keys());
    info!(
        missing = missing_keys.len(),
        duplicated = duplicate_keys.len(),
        "validated key coverage"
    );

    ValidationReport {
        missing_keys,
        duplicate_keys,
    }
}

/// Counts every key and keeps those seen more than once, ordered by first
/// appearance.
pub fn find_duplicates<'a>(keys: impl Iterator<Item = &'a CompositeKey>) -> Vec<DuplicateKey> {
    let mut order: Vec<&CompositeKey> = Vec::new();
    let mut counts: HashMap<&CompositeKey, usize> = HashMap::new();
    for key in keys {
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let occurrences = counts[key];
            (occurrences > 1).then(|| DuplicateKey {
                key: key.clone(),
                occurrences,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_keep_first_appearance_order() {
        let keys = [
            CompositeKey::new("2", "0-10"),
            CompositeKey::new("1", "0-10"),
            CompositeKey::new("2", "0-10"),
            CompositeKey::new("1", "0-10"),
            CompositeKey::new("1", "0-10"),
            CompositeKey::new("3", "10-20"),
        ];

        let duplicates = find_duplicates(keys.iter());

        assert_eq!(
            duplicates,
            vec![
                DuplicateKey {
                    key: CompositeKey::new("2", "0-10"),
                    occurrences: 2,
                },
                DuplicateKey {
                    key: CompositeKey::new("1", "0-10"),
                    occurrences: 3,
                },
            ]
        );
    }
}
