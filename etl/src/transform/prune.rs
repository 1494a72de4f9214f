//! Removal of columns the destination table does not keep.

use tracing::{debug, info};

use crate::models::Dataset;

pub const UNUSED_COLUMN: &str = "promo_code_used";

/// Drop `promo_code_used` if present.
pub fn drop_unused(dataset: &Dataset) -> Dataset {
    info!("Deleting unused column");
    drop_column(dataset, UNUSED_COLUMN)
}

/// Drop `name` if present; otherwise return an identical dataset.
pub fn drop_column(dataset: &Dataset, name: &str) -> Dataset {
    if !dataset.has_column(name) {
        debug!(column = name, "Column absent, nothing to drop");
    }
    dataset.clone().without_column(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Value};

    fn dataset(names: &[&str]) -> Dataset {
        Dataset::from_columns(
            names
                .iter()
                .map(|n| Column::new(*n, vec![Value::from(*n)]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_drops_promo_code_used() {
        let ds = dataset(&["age", "promo_code_used", "category"]);
        let out = drop_unused(&ds);
        assert_eq!(out.column_names(), vec!["age", "category"]);
        assert_eq!(out.column("age"), ds.column("age"));
        assert_eq!(out.column("category"), ds.column("category"));
    }

    #[test]
    fn test_noop_when_absent() {
        let ds = dataset(&["age", "category"]);
        assert_eq!(drop_unused(&ds), ds);
    }
}
