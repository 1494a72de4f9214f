//! Grouped median imputation of review ratings.

use std::collections::HashMap;

use tracing::{debug, info};

use super::stats::median;
use crate::models::{Dataset, Value};

pub const RATING_COLUMN: &str = "review_rating";
pub const GROUP_COLUMN: &str = "category";

/// Fill missing `review_rating` cells with the median rating of their `category`.
///
/// Medians use only non-missing numeric ratings of the same group. Groups
/// without any such rating, and rows whose category is missing, stay missing.
/// Returns the dataset unchanged when either column is absent.
pub fn impute_rating(dataset: &Dataset) -> Dataset {
    info!("Imputing missing review ratings");
    fill_grouped_median(dataset, RATING_COLUMN, GROUP_COLUMN)
}

/// Generic form of [`impute_rating`] for any target/group column pair.
pub fn fill_grouped_median(dataset: &Dataset, target: &str, group_by: &str) -> Dataset {
    let (Some(values), Some(groups)) = (dataset.column(target), dataset.column(group_by)) else {
        debug!(column = target, group_by, "Column absent, skipping imputation");
        return dataset.clone();
    };

    let mut members: HashMap<String, Vec<f64>> = HashMap::new();
    for (value, group) in values.values.iter().zip(&groups.values) {
        if let (Some(x), Some(key)) = (value.as_f64(), group.group_key()) {
            members.entry(key).or_default().push(x);
        }
    }
    let medians: HashMap<String, f64> = members
        .into_iter()
        .filter_map(|(key, xs)| median(&xs).map(|m| (key, m)))
        .collect();

    let mut filled = 0usize;
    let imputed: Vec<Value> = values
        .values
        .iter()
        .zip(&groups.values)
        .map(|(value, group)| match value {
            Value::Missing => match group.group_key().and_then(|k| medians.get(&k)) {
                Some(m) => {
                    filled += 1;
                    Value::Float(*m)
                }
                None => Value::Missing,
            },
            other => other.clone(),
        })
        .collect();

    debug!(column = target, filled, groups = medians.len(), "Imputation complete");
    dataset.clone().with_column(target, imputed)
}
